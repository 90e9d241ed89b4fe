//! Wisp main entry point
//!
//! Command-line interface for the wisp crawler. Flags mirror the TOML
//! configuration keys; when both are given, flags win.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wisp_crawler::browser::BrowserSession;
use wisp_crawler::config::{build_config, load_raw_config, Config, RawConfig};
use wisp_crawler::crawler::crawl;
use wisp_crawler::download::{download_all, resolve_name};

/// Wisp: a link crawler that renders pages in a headless browser
///
/// Wisp loads each page in headless Chrome so JavaScript-generated links
/// are captured, follows links up to a configured depth, and either lists
/// the collected URLs or downloads them under configurable file names.
#[derive(Parser, Debug)]
#[command(name = "wisp")]
#[command(version = "1.0.0")]
#[command(about = "A link crawler that renders pages in a headless browser", long_about = None)]
struct Cli {
    /// Seed URL; supports permutations in square brackets like '[1-100]'
    /// or '[a,b,c]', and '@path' to read one pattern per line from a file
    #[arg(long)]
    url: Option<String>,

    /// Path to a TOML configuration file supplying defaults for any flag
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Max depth for the link crawler
    #[arg(long)]
    depth: Option<u32>,

    /// Timeout in millis when loading a webpage
    #[arg(long, value_name = "MILLIS")]
    timeout: Option<u64>,

    /// Additional waittime in millis after the load event
    #[arg(long = "extra-waittime", value_name = "MILLIS")]
    extra_waittime: Option<u64>,

    /// Header to set as 'Key: Value', multiple allowed; prefix '@' to
    /// address a file
    #[arg(long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Basic auth header to set, provided as 'user:password'
    #[arg(long)]
    auth: Option<String>,

    /// User agent to set; defaults to a Chrome browser, 'none' avoids
    /// overriding the user agent
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Regex of included links
    #[arg(long)]
    include: Option<String>,

    /// Regex of excluded links
    #[arg(long)]
    exclude: Option<String>,

    /// Regex of included links to follow, only applies if depth > 0
    #[arg(long = "follow-include")]
    follow_include: Option<String>,

    /// Regex of excluded links to follow, only applies if depth > 0
    #[arg(long = "follow-exclude")]
    follow_exclude: Option<String>,

    /// Switch to download mode
    #[arg(long)]
    download: bool,

    /// Regex capturing groups of the output file name, used with
    /// --naming-pattern, only applies to download mode
    #[arg(long = "naming-capture")]
    naming_capture: Option<String>,

    /// Treat '/' inside capture groups as subfolders instead of
    /// replacing them with '_', only applies to download mode
    #[arg(long = "naming-capture-folders")]
    naming_capture_folders: bool,

    /// Pattern to resolve the output file name; '<name>' references a
    /// capture group from --naming-capture, only applies to download mode
    #[arg(long = "naming-pattern")]
    naming_pattern: Option<String>,

    /// Amount of reconnect attempts after the browser session was lost
    #[arg(long = "reconnect")]
    reconnect: Option<u32>,

    /// Skip downloads whose local file already exists
    #[arg(long = "skip-existing")]
    skip_existing: bool,

    /// Show expanded seed URLs (and download file names) without crawling
    #[arg(long)]
    dry_run: bool,

    /// Path to a log file, defaults to stderr when unset
    #[arg(long, value_name = "FILE")]
    logfile: Option<PathBuf>,

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

    setup_logging(cli.verbose, cli.quiet, cli.logfile.as_deref())?;

    let mut raw = match &cli.config {
        Some(path) => load_raw_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RawConfig::default(),
    };
    apply_overrides(&mut raw, &cli);

    let config = build_config(raw).context("Invalid configuration")?;
    tracing::info!(
        "Configuration loaded: {} seed(s), depth {}",
        config.seeds.len(),
        config.max_depth
    );

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config).await
}

/// Copies every flag the user actually passed over the file-supplied raw
/// configuration.
fn apply_overrides(raw: &mut RawConfig, cli: &Cli) {
    if cli.url.is_some() {
        raw.url = cli.url.clone();
    }
    if let Some(depth) = cli.depth {
        raw.depth = depth;
    }
    if let Some(timeout) = cli.timeout {
        raw.timeout = timeout;
    }
    if let Some(extra) = cli.extra_waittime {
        raw.extra_waittime = extra;
    }
    raw.headers.extend(cli.headers.iter().cloned());
    if cli.auth.is_some() {
        raw.auth = cli.auth.clone();
    }
    if cli.user_agent.is_some() {
        raw.user_agent = cli.user_agent.clone();
    }
    if let Some(include) = &cli.include {
        raw.include = include.clone();
    }
    if let Some(exclude) = &cli.exclude {
        raw.exclude = exclude.clone();
    }
    if let Some(follow_include) = &cli.follow_include {
        raw.follow_include = follow_include.clone();
    }
    if let Some(follow_exclude) = &cli.follow_exclude {
        raw.follow_exclude = follow_exclude.clone();
    }
    if cli.download {
        raw.download = true;
    }
    if let Some(capture) = &cli.naming_capture {
        raw.naming_capture = capture.clone();
    }
    if cli.naming_capture_folders {
        raw.naming_capture_folders = true;
    }
    if let Some(pattern) = &cli.naming_pattern {
        raw.naming_pattern = pattern.clone();
    }
    if let Some(reconnect) = cli.reconnect {
        raw.reconnect_attempts = reconnect;
    }
    if cli.skip_existing {
        raw.skip_existing = true;
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, logfile: Option<&std::path::Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wisp_crawler=info,warn"),
            1 => EnvFilter::new("wisp_crawler=debug,info"),
            2 => EnvFilter::new("wisp_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match logfile {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            builder.with_writer(std::io::stderr).init();
        }
    }
    Ok(())
}

/// Handles --dry-run: shows what would be crawled, without opening a
/// browser.
fn handle_dry_run(config: &Config) {
    println!("Seed URLs ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  {}", seed);
        if config.download {
            match resolve_name(
                seed,
                &config.naming_capture,
                &config.naming_pattern,
                config.naming_capture_folders,
            ) {
                Ok(dest) => println!("    -> {}", dest),
                Err(e) => println!("    -> no download: {}", e),
            }
        }
    }
}

/// Runs the crawl and emits or downloads the collected links.
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let session = BrowserSession::connect(config)
        .await
        .context("Could not open a browser session")?;

    let (links, session) = crawl(config, session).await;
    session.disconnect().await;

    let links = links.into_sorted_vec();

    if config.download {
        let downloaded = download_all(config, &links).await?;
        tracing::info!("Downloaded {} of {} collected links", downloaded, links.len());
    } else {
        for link in &links {
            println!("{}", link);
        }
    }

    Ok(())
}
