//! Recipe-Ripple main entry point
//!
//! This is the command-line interface for the Recipe-Ripple recipe discoverer.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use recipe_ripple::classifier::Classifier;
use recipe_ripple::config::{load_config_with_hash, Config};
use recipe_ripple::crawler::{build_session, fetch_body, load_classifier, Fetcher};
use recipe_ripple::document::PageDocument;
use recipe_ripple::features::{extract_features, FeatureVector};
use recipe_ripple::output::{
    aggregate, load_statistics, print_statistics, write_markdown_report, FeatureWriter, RankedPage,
};
use recipe_ripple::scoring::{score, SearchQuery, DEFAULT_THRESHOLD};
use recipe_ripple::storage::{open_storage, Storage};
use recipe_ripple::url::normalize_url;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Recipe-Ripple: A polite recipe page discoverer
///
/// Recipe-Ripple crawls outward from seed pages, keeps the pages a pretrained
/// classifier labels as recipes and ranks them against a title-plus-ingredients
/// query.
#[derive(Parser, Debug)]
#[command(name = "recipe-ripple")]
#[command(version)]
#[command(about = "A polite recipe page discoverer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH", default_value = "recipe-ripple.toml", global = true)]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from the configured seeds and print the ranked results as JSON
    Crawl,

    /// Fetch pages and append their feature rows to the training CSV
    Train {
        /// Pages to extract features from
        #[arg(required = true)]
        urls: Vec<String>,

        /// Feature CSV to append to (defaults to output.features-path)
        #[arg(long, value_name = "PATH")]
        features: Option<PathBuf>,
    },

    /// Fetch pages and classify them with the configured model
    Predict {
        /// Pages to classify
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Score a fixed list of pages against a recipe query
    Search {
        /// Pages to score
        #[arg(required = true)]
        urls: Vec<String>,

        /// Recipe title to look for (defaults to search.title)
        #[arg(long)]
        title: Option<String>,

        /// Ingredient to look for; repeat for several (defaults to search.ingredients)
        #[arg(long = "ingredient", value_name = "INGREDIENT")]
        ingredients: Vec<String>,

        /// Minimum final score (defaults to search.threshold)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Show statistics of the latest crawl run from the database
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded successfully (hash: {})", config_hash);

    let result = match cli.command {
        Command::Crawl if cli.dry_run => handle_dry_run(&config),
        Command::Crawl => handle_crawl(&config, &config_hash).await,
        Command::Train { urls, features } => handle_train(&config, &urls, features).await,
        Command::Predict { urls } => handle_predict(&config, &urls).await,
        Command::Search {
            urls,
            title,
            ingredients,
            threshold,
        } => handle_search(&config, &urls, title, ingredients, threshold).await,
        Command::Stats => handle_stats(&config),
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("recipe_ripple=info,warn"),
            1 => EnvFilter::new("recipe_ripple=debug,info"),
            2 => EnvFilter::new("recipe_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `crawl --dry-run`: shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Recipe-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Mode: {:?}", config.crawler.mode);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Link farm ratio: {}", config.crawler.link_farm_ratio);
    println!(
        "  Follow link farm links: {}",
        config.crawler.follow_link_farm_links
    );
    if config.crawler.max_duration_secs > 0 {
        println!("  Deadline: {}s", config.crawler.max_duration_secs);
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("  Timeout: {}s", config.user_agent.timeout_secs);

    if let Some(search) = &config.search {
        println!("\nQuery:");
        println!("  Title: {}", search.title);
        println!("  Ingredients: {}", search.ingredients.join(", "));
        println!("  Threshold: {}", search.threshold);
    }

    if let Some(classifier) = &config.classifier {
        println!("\nClassifier model: {}", classifier.model_path);
    }

    println!("\nOutput:");
    let show = |path: &Option<String>| path.clone().unwrap_or_else(|| "(disabled)".to_string());
    println!("  Database: {}", show(&config.output.database_path));
    println!("  Features: {}", show(&config.output.features_path));
    println!("  Report: {}", show(&config.output.report_path));
    println!("  Incremental: {}", config.output.incremental);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let session = build_session(config, config_hash).context("Failed to start crawl")?;

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let result = session.run().await.context("Crawl failed")?;

    println!("{}", result.to_json()?);

    if let Some(path) = &config.output.report_path {
        let query = config.search.as_ref().map(|s| s.query());
        write_markdown_report(&result, query.as_ref(), Path::new(path))
            .with_context(|| format!("Failed to write report to {}", path))?;
        tracing::info!("Report written to {}", path);
    }

    Ok(())
}

/// Fetches and parses each URL, handing the page to `analyze`
///
/// Pages that cannot be fetched or parsed are skipped with a warning; an
/// error from `analyze` aborts the whole command.
async fn analyze_urls<T>(
    config: &Config,
    urls: &[String],
    mut analyze: impl FnMut(&PageDocument) -> anyhow::Result<T>,
) -> anyhow::Result<Vec<T>> {
    let fetcher = Fetcher::new(&config.user_agent)?;
    let mut results = Vec::with_capacity(urls.len());

    for (i, raw) in urls.iter().enumerate() {
        if i > 0 && config.crawler.request_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(config.crawler.request_delay_ms))
                .await;
        }

        let url = match normalize_url(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", raw, e);
                continue;
            }
        };

        let (final_url, body) = match fetch_body(&fetcher, &url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        let page = match PageDocument::parse(final_url, &body) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        results.push(analyze(&page)?);
    }

    Ok(results)
}

/// Handles `train`: appends feature rows for each URL
async fn handle_train(
    config: &Config,
    urls: &[String],
    features: Option<PathBuf>,
) -> anyhow::Result<()> {
    let Some(path) = features.or_else(|| config.output.features_path.as_ref().map(PathBuf::from))
    else {
        bail!("No feature file configured; set output.features-path or pass --features");
    };

    let mut writer = FeatureWriter::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    analyze_urls(config, urls, |page| {
        let features = extract_features(page);
        writer.append(page.url(), &features)?;
        Ok(())
    })
    .await?;

    tracing::info!(
        "Appended {} of {} rows to {}",
        writer.rows_written(),
        urls.len(),
        path.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct Prediction {
    url: String,
    is_recipe: bool,
    features: FeatureVector,
}

/// Handles `predict`: classifies each URL with the configured model
async fn handle_predict(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let Some(classifier) = load_classifier(config).context("Failed to load classifier")? else {
        bail!("No classifier configured; add a [classifier] section with model-path");
    };

    let predictions = analyze_urls(config, urls, |page| {
        let features = extract_features(page);
        let is_recipe = classifier.predict(&features)?;
        Ok(Prediction {
            url: page.url().to_string(),
            is_recipe,
            features,
        })
    })
    .await?;

    println!("{}", serde_json::to_string_pretty(&predictions)?);
    Ok(())
}

/// Handles `search`: scores a fixed URL list against a query
async fn handle_search(
    config: &Config,
    urls: &[String],
    title: Option<String>,
    ingredients: Vec<String>,
    threshold: Option<f64>,
) -> anyhow::Result<()> {
    let defaults = config.search.as_ref();
    let query = SearchQuery::new(
        title
            .or_else(|| defaults.map(|s| s.title.clone()))
            .unwrap_or_default(),
        if ingredients.is_empty() {
            defaults.map(|s| s.ingredients.clone()).unwrap_or_default()
        } else {
            ingredients
        },
    );
    let threshold = threshold
        .or_else(|| defaults.map(|s| s.threshold))
        .unwrap_or(DEFAULT_THRESHOLD);

    if !(0.0..=1.0).contains(&threshold) {
        bail!("threshold must be within [0, 1], got {}", threshold);
    }

    let scored = analyze_urls(config, urls, |page| {
        let detail = score(page, &query);
        Ok(detail.matches(threshold).then(|| RankedPage {
            url: page.url().to_string(),
            score: detail.final_score,
            depth: 0,
            title: Some(page.title().to_string()).filter(|t| !t.is_empty()),
            detail: Some(detail),
            is_recipe: None,
        }))
    })
    .await?;

    let result = aggregate(scored.into_iter().flatten().collect());
    println!("{}", result.to_json()?);
    Ok(())
}

/// Handles `stats`: shows statistics of the latest run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let Some(path) = &config.output.database_path else {
        bail!("No database configured; set output.database-path");
    };

    println!("Database: {}\n", path);
    let storage = open_storage(Path::new(path))?;

    let Some(run) = storage.get_latest_run()? else {
        println!("No crawl runs recorded yet");
        return Ok(());
    };

    println!(
        "Run {} ({}, mode {}), started {}\n",
        run.id,
        run.status.to_db_string(),
        run.mode,
        run.started_at
    );

    let stats = load_statistics(&storage, run.id)?;
    print_statistics(&stats);

    let top = storage.get_top_matches(run.id, 10)?;
    if !top.is_empty() {
        println!("\nTop Matches:");
        for (rank, record) in top.iter().enumerate() {
            println!("  {}. {:.3} {}", rank + 1, record.score, record.url);
        }
    }

    Ok(())
}
