//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use seedscope_core::pipeline::{DiscoveryReport, ProgressReporter, run_discovery};
use seedscope_provider::ProviderClient;
use seedscope_shared::{
    AppConfig, DiscoveryOptions, KeywordRecord, SeedScopeError, init_config, load_config,
    resolve_credentials,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SeedScope — find and rank keyword opportunities from seed phrases.
#[derive(Parser)]
#[command(
    name = "seedscope",
    version,
    about = "Expand seed keywords into a ranked list of keyword opportunities.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover and rank keywords for one or more seed phrases.
    Discover(DiscoverArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `discover`. Unset flags fall back to the config file.
#[derive(clap::Args, Debug)]
pub(crate) struct DiscoverArgs {
    /// Seed phrases.
    #[arg(required = true)]
    pub seeds: Vec<String>,

    /// Maximum suggestions per seed.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Related-keyword expansion depth (0-4).
    #[arg(long)]
    pub depth: Option<u32>,

    /// Maximum related keywords per candidate.
    #[arg(long)]
    pub related_limit: Option<u32>,

    /// Maximum related-keyword requests in flight.
    #[arg(long)]
    pub concurrency: Option<u32>,

    /// Provider location code (e.g. 2840 for the United States).
    #[arg(long)]
    pub location_code: Option<u32>,

    /// Provider language name.
    #[arg(long)]
    pub language: Option<String>,

    /// Write the full JSON report to this file.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format for stdout.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    /// Only print the top N keywords.
    #[arg(long)]
    pub top: Option<usize>,
}

impl DiscoverArgs {
    /// Merge flags over the config-file defaults.
    fn options(&self, config: &AppConfig) -> DiscoveryOptions {
        let mut options = DiscoveryOptions::from(config);
        if let Some(limit) = self.limit {
            options.seed_limit = limit;
        }
        if let Some(depth) = self.depth {
            options.related_depth = depth;
        }
        if let Some(limit) = self.related_limit {
            options.related_limit = limit;
        }
        if let Some(concurrency) = self.concurrency {
            options.max_concurrency = concurrency;
        }
        if let Some(code) = self.location_code {
            options.location_code = code;
        }
        if let Some(language) = &self.language {
            options.language_name = language.clone();
        }
        options
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "seedscope=info",
        1 => "seedscope=debug",
        _ => "seedscope=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `--format json` output stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Discover(args) => cmd_discover(&args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_discover(args: &DiscoverArgs) -> Result<()> {
    let config = load_config()?;
    let credentials = resolve_credentials(&config.provider)?;
    let client = ProviderClient::new(&config.provider, credentials)?;
    let options = args.options(&config);

    info!(
        seeds = ?args.seeds,
        location = options.location_code,
        language = %options.language_name,
        "discovering keywords"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let reporter = CliProgress::new();
    let report = match run_discovery(&client, &args.seeds, &options, &reporter, &cancel).await {
        Ok(report) => report,
        Err(SeedScopeError::Cancelled) => {
            reporter.spinner.finish_and_clear();
            return Err(eyre!("discovery cancelled"));
        }
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    if let Some(path) = &args.out {
        write_report(path, &report)?;
        info!(path = %path.display(), "report written");
    }

    let shown = match args.top {
        Some(n) => &report.keywords[..n.min(report.keywords.len())],
        None => &report.keywords[..],
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(shown)?),
        OutputFormat::Table => print_table(shown, &report),
    }

    Ok(())
}

fn write_report(path: &Path, report: &DiscoveryReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| eyre!("cannot create {}: {e}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|e| eyre!("cannot write {}: {e}", path.display()))?;
    Ok(())
}

fn print_table(records: &[KeywordRecord], report: &DiscoveryReport) {
    println!();
    println!(
        "  {:<40} {:>8} {:>7} {:>6} {:<7} {:>6} {:>9} {:>7} {:>6}",
        "KEYWORD", "VOLUME", "CPC", "COMP", "LEVEL", "KD", "TRAFFIC", "AI VOL", "SCORE"
    );
    for r in records {
        println!(
            "  {:<40} {:>8} {:>7.2} {:>6.2} {:<7} {:>6} {:>9.2} {:>7} {:>6.2}",
            truncate(&r.keyword, 40),
            r.search_volume,
            r.cpc,
            r.competition,
            r.competition_level.as_str(),
            r.keyword_difficulty.to_string(),
            r.estimated_traffic,
            r.ai_search_volume,
            r.keyword_score,
        );
    }

    let stats = &report.stats;
    println!();
    println!(
        "  {} keywords ({} shown) from {} seed(s)",
        report.keywords.len(),
        records.len(),
        report.seeds.len()
    );
    println!(
        "  Related: {} requests, {} failed  |  Duplicates removed: {}",
        stats.related_requests, stats.related_failed, stats.duplicates_removed
    );
    if !stats.unmatched.is_empty() {
        println!("  No metrics for {} related keyword(s)", stats.unmatched.len());
    }
    println!("  Time: {:.1}s", stats.elapsed_ms as f64 / 1000.0);
    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn seed_expanded(&self, seed: &str, candidates: usize) {
        self.spinner
            .set_message(format!("Expanded '{seed}' into {candidates} candidates"));
    }

    fn done(&self, _report: &DiscoveryReport) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
