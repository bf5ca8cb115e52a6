use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use recipe_ripple::config::load_config;
///
/// let config = load_config(Path::new("recipe-ripple.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is recorded with every crawl run to tell runs with different settings apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[crawler]
seeds = ["https://example.com/recipes"]
max-depth = 2
max-pages = 50
request-delay-ms = 1000
mode = "both"

[user-agent]
crawler-name = "Recipe-Collector-Bot"
crawler-version = "1.0"
contact-url = "https://example.com/bot"

[search]
title = "chocolate chip cookies"
ingredients = ["butter", "sugar", "flour"]

[classifier]
model-path = "model.json"

[output]
features-path = "features.csv"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.max_pages, 50);
        assert_eq!(config.crawler.mode, GateMode::Both);
        assert_eq!(config.crawler.link_farm_ratio, 0.5);
        assert!(!config.crawler.follow_link_farm_links);
        assert_eq!(config.user_agent.timeout_secs, 10);
        assert_eq!(
            config.user_agent.header_value(),
            "Recipe-Collector-Bot/1.0 (+https://example.com/bot)"
        );

        let search = config.search.unwrap();
        assert_eq!(search.threshold, 0.4);
        assert_eq!(search.query().ingredients.len(), 3);
        assert_eq!(config.output.features_path.as_deref(), Some("features.csv"));
        assert_eq!(config.output.database_path, None);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_discovery_mode_requires_classifier() {
        let content = r#"
[crawler]
seeds = ["https://example.com/"]
max-depth = 1
max-pages = 10
request-delay-ms = 0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/bot"
"#;
        let result = parse_config(content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_max_pages_is_rejected() {
        let content = VALID_CONFIG.replace("max-pages = 50", "max-pages = 0");
        assert!(matches!(
            parse_config(&content),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
