//! MCQ-Harvest main entry point
//!
//! This is the command-line interface for the MCQ-Harvest question harvester.

use anyhow::Context;
use clap::Parser;
use mcq_harvest::config::{load_config_with_hash, override_page_range, Config};
use mcq_harvest::crawler::{crawl, CrawlSettings, PageAddress, StartPage};
use mcq_harvest::output::{export_records, load_statistics, print_statistics};
use mcq_harvest::storage::{open_checkpoint, CheckpointStore};
use mcq_harvest::RunPhase;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// MCQ-Harvest: a resumable multiple-choice question harvester
///
/// MCQ-Harvest walks a paginated category listing one page at a time,
/// extracts question records, and checkpoints them so an interrupted run
/// can pick up where it left off.
#[derive(Parser, Debug)]
#[command(name = "mcq-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable multiple-choice question harvester", long_about = None)]
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

    /// Continue after the last page recorded in the checkpoint
    #[arg(long, conflicts_with_all = ["fresh", "start_page"])]
    resume: bool,

    /// Start with no records, ignoring any existing checkpoint
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Override the configured first page
    #[arg(long, value_name = "N")]
    start_page: Option<u32>,

    /// Override the configured last page
    #[arg(long, value_name = "N")]
    end_page: Option<u32>,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export"])]
    dry_run: bool,

    /// Show statistics from the checkpoint and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export"])]
    stats: bool,

    /// Write the checkpoint's records to PATH as a plain JSON array and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    override_page_range(&mut config, cli.start_page, cli.end_page)
        .context("invalid page range on the command line")?;

    let settings = build_settings(&cli, &config, config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, &settings)
    } else if cli.stats {
        handle_stats(&config)
    } else if let Some(path) = &cli.export {
        handle_export(&config, path)
    } else {
        handle_crawl(&config, settings).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mcq_harvest=info,warn"),
            1 => EnvFilter::new("mcq_harvest=debug,info"),
            2 => EnvFilter::new("mcq_harvest=trace,debug"),
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

/// Builds run settings from the (already range-overridden) configuration
fn build_settings(cli: &Cli, config: &Config, config_hash: String) -> CrawlSettings {
    let mut settings = CrawlSettings::from_config(config);
    settings.config_hash = Some(config_hash);
    settings.fresh = cli.fresh;

    if cli.resume {
        settings.start = StartPage::FromCheckpoint;
    }

    settings
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, settings: &CrawlSettings) -> anyhow::Result<()> {
    println!("=== MCQ-Harvest Dry Run ===\n");

    let address = PageAddress::new(&config.source.base_url, &config.source.page_segment)?;
    let store = open_checkpoint(Path::new(&config.output.checkpoint_path));

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Page segment: {}", config.source.page_segment);

    println!("\nCrawler Configuration:");
    println!("  Checkpoint interval: {} pages", settings.checkpoint_interval);
    println!("  Page delay: {:?}", settings.page_delay);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nExtraction:");
    println!("  Blocks: {}", config.extract.block_selector);
    println!("  Prompt: {}", config.extract.prompt_selector);
    println!("  Choices: {}", config.extract.choices_selector);

    println!("\nCheckpoint:");
    println!("  Path: {}", store.describe());
    let held = if settings.fresh {
        println!("  Status: ignored (--fresh)");
        None
    } else if store.exists() {
        let state = store
            .load()
            .with_context(|| format!("checkpoint {} is unreadable", store.describe()))?;
        println!(
            "  Status: {} records, last completed page {}",
            state.len(),
            state.last_completed_page
        );
        Some(state)
    } else {
        println!("  Status: none yet");
        None
    };

    let start = match settings.start {
        StartPage::Explicit(page) => page,
        StartPage::FromCheckpoint => held.as_ref().map_or(1, |state| state.next_page()),
    };

    println!("\n✓ Configuration is valid");
    if settings.start == StartPage::FromCheckpoint
        && held.as_ref().is_some_and(|state| state.has_untracked_records())
    {
        println!("! Checkpoint has records but no page progress; --resume would refetch from page 1");
    }
    if start > settings.end_page {
        println!("✓ Nothing to fetch: page {} is past the end ({})", start, settings.end_page);
    } else {
        println!(
            "✓ Would fetch pages {}..={} ({} pages)",
            start,
            settings.end_page,
            u64::from(settings.end_page) - u64::from(start) + 1
        );
        println!("  First: {}", address.page_url(start)?);
        println!("  Last: {}", address.page_url(settings.end_page)?);
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the checkpoint
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_checkpoint(Path::new(&config.output.checkpoint_path));
    let stats = load_statistics(&store)
        .with_context(|| format!("cannot read checkpoint {}", store.describe()))?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the --export mode: writes records as a plain array
fn handle_export(config: &Config, path: &Path) -> anyhow::Result<()> {
    println!("=== Exporting Records ===\n");
    println!("Checkpoint: {}", config.output.checkpoint_path);
    println!("Output: {}", path.display());
    println!();

    let store = open_checkpoint(Path::new(&config.output.checkpoint_path));
    let state = store
        .load()
        .with_context(|| format!("cannot read checkpoint {}", store.describe()))?;
    let written = export_records(&state, path)
        .with_context(|| format!("cannot write export {}", path.display()))?;

    println!("✓ {} records exported to: {}", written, path.display());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, settings: CrawlSettings) -> anyhow::Result<()> {
    if settings.fresh {
        tracing::info!("Starting fresh harvest (ignoring previous checkpoint)");
    } else if settings.start == StartPage::FromCheckpoint {
        tracing::info!("Resuming after the last completed page in the checkpoint");
    }

    let report = crawl(config, settings).await.context("harvest failed")?;

    println!("\n{}", report);
    if report.phase == RunPhase::Interrupted {
        println!("\nRun again with --resume to continue.");
    }

    Ok(())
}
