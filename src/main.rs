//! Dataset-Mirror main entry point
//!
//! This is the command-line interface for the Dataset-Mirror archiver.

use anyhow::Context;
use clap::Parser;
use dataset_mirror::config::{load_config_with_hash, Config};
use dataset_mirror::crawler::Coordinator;
use dataset_mirror::output::{print_summary, read_datasets};
use dataset_mirror::sync::{ObjectStore, S3Store};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dataset-Mirror: an archiver for open-data portals
///
/// Dataset-Mirror crawls a paginated dataset listing, downloads the files
/// each dataset offers and mirrors them to an S3-compatible bucket, only
/// uploading files whose content changed since the last run.
#[derive(Parser, Debug)]
#[command(name = "dataset-mirror")]
#[command(version)]
#[command(about = "Mirror an open-data portal to object storage", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be mirrored without fetching anything
    #[arg(long, conflicts_with_all = ["crawl_only", "datasets", "skip_sync"])]
    dry_run: bool,

    /// Crawl the listing, write the dataset list and exit
    #[arg(long, conflicts_with_all = ["dry_run", "datasets"])]
    crawl_only: bool,

    /// Skip the crawl and process the dataset URLs in this JSON file
    #[arg(long, value_name = "FILE")]
    datasets: Option<PathBuf>,

    /// Download files but do not touch the remote store
    #[arg(long)]
    skip_sync: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    // Credentials are checked before any network work starts
    let store = if cli.skip_sync || cli.crawl_only {
        None
    } else {
        Some(S3Store::from_config(&config.store).context("failed to set up the remote store")?)
    };

    let coordinator = Coordinator::new(config)?;

    if cli.crawl_only {
        let targets = coordinator.discover().await?;
        println!("✓ Found {} datasets", targets.len());
        return Ok(());
    }

    let store = store.as_ref().map(|s| s as &dyn ObjectStore);
    let report = match &cli.datasets {
        Some(path) => {
            let targets = read_datasets(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            tracing::info!("Replaying {} datasets from {}", targets.len(), path.display());
            coordinator.run_targets(targets, store).await
        }
        None => coordinator.run(store).await.context("mirror run failed")?,
    };

    print_summary(&report.tally);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dataset_mirror=info,warn"),
            1 => EnvFilter::new("dataset_mirror=debug,info"),
            2 => EnvFilter::new("dataset_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Dataset-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!(
        "  Retries (listing/detail/file): {}/{}/{}",
        config.crawler.listing_retries, config.crawler.detail_retries, config.crawler.file_retries
    );
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Accepted types: {}", config.crawler.valid_types.join(", "));

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  Dataset list: {}", config.output.datasets_path);

    println!("\nStore:");
    println!("  Endpoint: {}", config.store.endpoint);
    println!("  Bucket: {}", config.store.bucket);
    if !config.store.prefix.is_empty() {
        println!("  Prefix: {}", config.store.prefix);
    }
    println!(
        "  Credentials from: {}, {}",
        config.store.access_key_env, config.store.secret_key_env
    );

    println!("\n✓ Configuration is valid");
}
