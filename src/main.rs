//! Linkcheck command-line entry point

use anyhow::Context;
use clap::Parser;
use linkcheck::config::{load_config, CrawlConfig};
use linkcheck::crawler::run_crawl;
use linkcheck::report::ReportStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkcheck: crawl a website and report its broken links
///
/// Starting from the base URL, linkcheck follows every discovered link,
/// records the HTTP status of each resource together with the page it was
/// found on, and writes a JSON report plus a CSV of the failing links.
#[derive(Parser, Debug)]
#[command(name = "linkcheck")]
#[command(version)]
#[command(about = "Crawl a website and report its broken links", long_about = None)]
struct Cli {
    /// Base URL to start crawling from
    #[arg(value_name = "BASE_URL", required_unless_present_any = ["config", "show_last"])]
    base_url: Option<String>,

    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Crawl this URL instead of the configured base URL (staging copies)
    #[arg(long, value_name = "URL")]
    test_url: Option<String>,

    /// Maximum number of fetches in flight at once
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Only fetch URLs on the base URL's host
    #[arg(long)]
    internal_only: bool,

    /// Consult robots.txt before fetching
    #[arg(long)]
    respect_robots: bool,

    /// Directory the report artifacts are written into
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print the last persisted report as JSON and exit
    #[arg(long, conflicts_with_all = ["base_url", "test_url"])]
    show_last: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.show_last {
        let store = ReportStore::new(&config.output.dir);
        println!("{}", store.load_last()?);
        return Ok(());
    }

    let (report, run) = run_crawl(config.clone(), cli.test_url.clone())
        .await
        .context("crawl failed")?;

    let broken: usize = report.failing_rows().count();
    println!("Crawl of {} finished.", run.base_url);
    for (key, rows) in report.buckets() {
        println!("  HTTP {}: {} links", key, rows.len());
    }
    println!("{} broken links.", broken);

    let store = ReportStore::new(&config.output.dir);
    println!("Report: {}", store.report_path().display());
    println!("CSV:    {}", store.csv_path().display());

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkcheck=info,warn"),
            1 => EnvFilter::new("linkcheck=debug,info"),
            2 => EnvFilter::new("linkcheck=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Builds the effective configuration: file first, then flag overrides
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            // --show-last needs no base URL; fall back to a placeholder so
            // only the output directory matters.
            let base = cli
                .base_url
                .clone()
                .unwrap_or_else(|| "http://localhost/".to_string());
            CrawlConfig::for_base_url(base)
        }
    };

    if let Some(base_url) = &cli.base_url {
        config.crawl.base_url = base_url.clone();
    }
    if let Some(max_concurrent) = cli.max_concurrent {
        config.crawl.max_concurrent = max_concurrent;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.crawl.timeout_secs = timeout_secs;
    }
    if cli.internal_only {
        config.crawl.crawl_external = false;
    }
    if cli.respect_robots {
        config.crawl.ignore_robots = false;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.display().to_string();
    }

    Ok(config)
}
