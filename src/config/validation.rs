use crate::config::types::{Config, CrawlerConfig, OutputConfig, SearchConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_gates(config)?;
    if let Some(search) = &config.search {
        validate_search_config(search)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if !(config.link_farm_ratio.is_finite() && config.link_farm_ratio > 0.0) {
        return Err(ConfigError::Validation(format!(
            "link_farm_ratio must be a positive number, got {}",
            config.link_farm_ratio
        )));
    }

    Ok(())
}

/// Validates a seed URL: must parse and use HTTP(S)
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens/underscores only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every gate the mode needs is configured
fn validate_gates(config: &Config) -> Result<(), ConfigError> {
    let mode = config.crawler.mode;

    if mode.uses_classifier() && config.classifier.is_none() {
        return Err(ConfigError::Validation(format!(
            "mode {:?} requires a [classifier] section",
            mode
        )));
    }

    if mode.uses_scorer() && config.search.is_none() {
        return Err(ConfigError::Validation(format!(
            "mode {:?} requires a [search] section",
            mode
        )));
    }

    Ok(())
}

/// Validates the search query section
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.threshold) {
        return Err(ConfigError::Validation(format!(
            "search threshold must be within [0, 1], got {}",
            config.threshold
        )));
    }

    if config.title.trim().is_empty() && config.ingredients.is_empty() {
        tracing::warn!("Search query has neither a title nor ingredients; every page will score 0");
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("database_path", &config.database_path),
        ("features_path", &config.features_path),
        ("report_path", &config.report_path),
    ] {
        if matches!(path, Some(p) if p.is_empty()) {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.incremental && config.database_path.is_none() {
        return Err(ConfigError::Validation(
            "incremental crawls require database_path".to_string(),
        ));
    }

    Ok(())
}
