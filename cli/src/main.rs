mod fetch;

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use rally_stats_core::Weights;
use rally_stats_discovery::analysis::{Analysis, analyze_document};
use rally_stats_discovery::discover::{DEFAULT_STEP_LIMIT, DiscoveryConfig};
use rally_stats_discovery::load::{read_document, read_from};
use rally_stats_discovery::output::{
    OutputFormat, StatsReport, SummaryView, format_events, format_keys, format_stats,
    format_summary,
};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "rally-stats")]
#[command(version)]
#[command(about = "Discover rally events in app exports and compute player stats")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show event counts by type, result and player.
    Summary(SummaryArgs),
    /// List the keys of the export's key bag.
    Keys(KeysArgs),
    /// List players observed in the export.
    Players(PlayersArgs),
    /// Print canonical rally events.
    Events(EventsArgs),
    /// Per-match decision and effect rates for one player.
    Stats(StatsArgs),
    /// Print the default weights table as YAML.
    Weights,
}

/// Where the export document comes from. Defaults to stdin.
#[derive(Debug, Args)]
struct SourceArgs {
    /// Read the export from a local JSON file.
    #[arg(long, conflicts_with = "latest")]
    input: Option<PathBuf>,
    /// Fetch `latest.json` relative to this base URL (cache bypassed).
    #[arg(long, value_name = "BASE_URL")]
    latest: Option<String>,
    /// Maximum number of nodes visited during event discovery.
    #[arg(long, default_value_t = DEFAULT_STEP_LIMIT)]
    step_limit: usize,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct KeysArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct PlayersArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Emit a JSON array instead of one id per line.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct EventsArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct StatsArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Player id to report on. Omit to report unassigned attempts.
    #[arg(long)]
    player: Option<String>,
    /// YAML or JSON weights table; defaults to the built-in table.
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Summary(args) => run_summary(args),
        Command::Keys(args) => run_keys(args),
        Command::Players(args) => run_players(args),
        Command::Events(args) => run_events(args),
        Command::Stats(args) => run_stats(args),
        Command::Weights => run_weights(),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Library events go through `tracing`'s `log` bridge to `env_logger` on
/// stderr.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

impl SourceArgs {
    fn label(&self) -> String {
        match (&self.input, &self.latest) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(base)) => base.clone(),
            (None, None) => "<stdin>".to_string(),
        }
    }

    fn load(&self) -> Result<Value, String> {
        let loaded = match (&self.input, &self.latest) {
            (Some(path), _) => read_document(path),
            (None, Some(base)) => fetch::fetch_latest(base),
            (None, None) => read_from("<stdin>", std::io::stdin().lock()),
        };
        loaded.map_err(|err| err.to_string())
    }

    fn analyze(&self) -> Result<Analysis, String> {
        if self.step_limit == 0 {
            return Err("--step-limit must be greater than 0".to_string());
        }
        let doc = self.load()?;
        let config = DiscoveryConfig {
            step_limit: self.step_limit,
            ..DiscoveryConfig::default()
        };
        let analysis = analyze_document(&doc, &config);
        if analysis.is_empty() {
            warn!(
                source = %self.label(),
                "No event-like records found; the export structure or field names may differ"
            );
        }
        Ok(analysis)
    }
}

/// Renders an RFC 3339 export timestamp in local time; other values pass
/// through unchanged.
fn display_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| {
            at.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S %:z")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

fn print_output(text: &str) -> Result<(), String> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| {
            if text.ends_with('\n') {
                Ok(())
            } else {
                stdout.write_all(b"\n")
            }
        })
        .map_err(|err| format!("Failed to write output: {err}"))
}

fn run_summary(args: SummaryArgs) -> Result<(), String> {
    let analysis = args.source.analyze()?;
    let label = args.source.label();
    let format = args.format;

    let local_time = analysis.exported_at.as_deref().map(display_timestamp);
    let mut view = SummaryView::new(&analysis, Some(&label));
    if matches!(format, OutputFormat::Markdown | OutputFormat::Table) {
        view.exported_at = local_time.as_deref();
    }

    print_output(&format_summary(&view, format)?)
}

fn run_keys(args: KeysArgs) -> Result<(), String> {
    let analysis = args.source.analyze()?;
    print_output(&format_keys(&analysis.keys, args.format)?)
}

fn run_players(args: PlayersArgs) -> Result<(), String> {
    let analysis = args.source.analyze()?;
    if args.json {
        let json = serde_json::to_string_pretty(&analysis.players)
            .map_err(|err| format!("JSON serialization failed: {err}"))?;
        return print_output(&json);
    }
    let lines: String = analysis
        .players
        .iter()
        .map(|p| format!("{}\n", p.id))
        .collect();
    if lines.is_empty() {
        return Ok(());
    }
    print_output(&lines)
}

fn run_events(args: EventsArgs) -> Result<(), String> {
    let analysis = args.source.analyze()?;
    print_output(&format_events(&analysis.events, args.format)?)
}

fn run_stats(args: StatsArgs) -> Result<(), String> {
    let weights = match &args.weights {
        Some(path) => Weights::load(path)
            .map_err(|err| format!("Failed to load weights '{}': {err}", path.display()))?,
        None => Weights::default(),
    };
    let analysis = args.source.analyze()?;
    let player = args.player.as_deref();
    let stats = analysis.player_stats(player, &weights);
    let report = StatsReport {
        player,
        matches: &stats,
    };
    print_output(&format_stats(&report, args.format)?)
}

fn run_weights() -> Result<(), String> {
    let yaml = Weights::default()
        .to_yaml()
        .map_err(|err| format!("Failed to render weights: {err}"))?;
    print_output(&yaml)
}
