mod output;

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use vcanalyze_core::{AnalyzeError, AnalyzerConfig, OutputFormat, CONFIG_FILE_NAME};
use vcanalyze_history::antipatterns::{detect_anti_patterns, AntiPatternOptions};
use vcanalyze_history::bottlenecks::detect_bottlenecks;
use vcanalyze_history::branches::{classify_branches, inactive_after};
use vcanalyze_history::source::CommitSource;

use crate::output::Report;

#[derive(Parser)]
#[command(
    name = "vc-analyze",
    version,
    about = "Commit history statistics for local git repositories",
    long_about = "vc-analyze walks the history reachable from HEAD and reports who commits,\n\
                   how large commit messages are, which branches are stale, which files churn,\n\
                   and which history anti-patterns are present.\n\n\
                   Examples:\n  \
                     vc-analyze history .            Commits per author\n  \
                     vc-analyze commit-size .        Commit message size totals\n  \
                     vc-analyze branches .           Active vs inactive branches\n  \
                     vc-analyze anti-patterns .      Large, merge, and infrequent commits\n  \
                     vc-analyze bottlenecks .        Frequently changed files\n  \
                     vc-analyze report . --format json  Everything, machine-readable"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .vc-analyze.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Plain line-per-fact report (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Count commits per author
    #[command(long_about = "Count commits per author.\n\n\
        Walks every commit reachable from HEAD and lists authors by descending\n\
        commit count. Authors are grouped by display name.\n\n\
        Examples:\n  vc-analyze history .\n  vc-analyze history ../other-repo --format json")]
    History {
        /// Repository path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Summarize commit message sizes
    CommitSize {
        /// Repository path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Classify local branches as active or inactive
    #[command(long_about = "Classify local branches as active or inactive.\n\n\
        A branch is active while its tip commit is younger than\n\
        thresholds.inactive_branch_days (default: 90).\n\n\
        Examples:\n  vc-analyze branches .")]
    Branches {
        /// Repository path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Detect large commits, merge commits, and infrequent commits
    AntiPatterns {
        /// Repository path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// List files changed in many commits
    Bottlenecks {
        /// Repository path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Run every analysis in one pass over the repository
    Report {
        /// Repository path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Create a default .vc-analyze.toml in the current directory
    Init,
    /// Generate shell completions
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# vc-analyze configuration

[thresholds]
# Commit messages longer than this many bytes count as large.
# large_message_bytes = 1000

# Flag infrequent commits when any commit is this many days older than HEAD.
# infrequent_gap_days = 7

# Branches whose tip is at least this many days old are inactive.
# inactive_branch_days = 90

# Files changed in more than this many commits are bottlenecks.
# bottleneck_threshold = 2
"#;

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("vc-analyze v{version} — commit history statistics for git repositories\n");

    println!("All commands:");
    println!("  history        Commits per author, most active first");
    println!("  commit-size    Total and average commit message size");
    println!("  branches       Active and inactive local branches");
    println!("  anti-patterns  Large commits, merge commits, infrequent commits");
    println!("  bottlenecks    Files changed in many commits");
    println!("  report         All of the above");
    println!("  init           Create default configuration\n");

    println!("Run 'vc-analyze <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<AnalyzerConfig> {
    let config = match explicit {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if default_path.exists() {
                AnalyzerConfig::from_file(default_path)?
            } else {
                AnalyzerConfig::default()
            }
        }
    };
    tracing::debug!(thresholds = ?config.thresholds, "configuration loaded");
    Ok(config)
}

fn open_source(path: &Path) -> Result<CommitSource> {
    if !path.exists() {
        return Err(AnalyzeError::PathNotFound(path.to_path_buf()).into());
    }
    tracing::debug!(path = %path.display(), "opening repository");
    Ok(CommitSource::open(path)?)
}

fn emit(reports: &[Report<'_>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json if reports.len() > 1 => {
            let mut json = serde_json::Map::new();
            for report in reports {
                json.insert(report.key().into(), report.json()?);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Object(json)).into_diagnostic()?
            );
        }
        _ => {
            let rendered = reports
                .iter()
                .map(|r| r.render(format))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let separator = if format == OutputFormat::Json { "" } else { "\n" };
            let body = rendered.join(separator);
            print!("{body}");
            if format == OutputFormat::Json {
                println!();
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Read lazily: only threshold-driven commands may fail on a bad config.
    let thresholds = || load_config(cli.config.as_deref()).map(|config| config.thresholds);

    match cli.command {
        None => {
            print_welcome();
        }
        Some(Command::History { ref path }) => {
            let source = open_source(path)?;
            let stats = vcanalyze_history::analyze_history(&source)?;
            emit(&[Report::History(&stats)], cli.format)?;
        }
        Some(Command::CommitSize { ref path }) => {
            let source = open_source(path)?;
            let size = vcanalyze_history::analyze_commit_sizes(&source)?;
            emit(&[Report::CommitSize(&size)], cli.format)?;
        }
        Some(Command::Branches { ref path }) => {
            let thresholds = thresholds()?;
            let source = open_source(path)?;
            let activity = classify_branches(&source, Utc::now(), inactive_after(&thresholds))?;
            emit(&[Report::Branches(&activity)], cli.format)?;
        }
        Some(Command::AntiPatterns { ref path }) => {
            let thresholds = thresholds()?;
            let source = open_source(path)?;
            let report = detect_anti_patterns(&source, &AntiPatternOptions::from(&thresholds))?;
            emit(
                &[Report::AntiPatterns {
                    report: &report,
                    gap_days: thresholds.infrequent_gap_days,
                }],
                cli.format,
            )?;
        }
        Some(Command::Bottlenecks { ref path }) => {
            let thresholds = thresholds()?;
            let source = open_source(path)?;
            let stats = vcanalyze_history::analyze_history(&source)?;
            let files = detect_bottlenecks(&stats.file_changes, thresholds.bottleneck_threshold);
            emit(
                &[Report::Bottlenecks {
                    files: &files,
                    threshold: thresholds.bottleneck_threshold,
                }],
                cli.format,
            )?;
        }
        Some(Command::Report { ref path }) => {
            let thresholds = thresholds()?;
            let source = open_source(path)?;
            let stats = vcanalyze_history::analyze_history(&source)?;
            let activity = classify_branches(&source, Utc::now(), inactive_after(&thresholds))?;
            let anti = detect_anti_patterns(&source, &AntiPatternOptions::from(&thresholds))?;
            let files = detect_bottlenecks(&stats.file_changes, thresholds.bottleneck_threshold);
            emit(
                &[
                    Report::History(&stats),
                    Report::CommitSize(&stats.size),
                    Report::Branches(&activity),
                    Report::AntiPatterns {
                        report: &anti,
                        gap_days: thresholds.infrequent_gap_days,
                    },
                    Report::Bottlenecks {
                        files: &files,
                        threshold: thresholds.bottleneck_threshold,
                    },
                ],
                cli.format,
            )?;
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE_NAME);
            if path.exists() {
                miette::bail!("{CONFIG_FILE_NAME} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE_NAME} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "vc-analyze", &mut std::io::stdout());
        }
    }

    Ok(())
}
