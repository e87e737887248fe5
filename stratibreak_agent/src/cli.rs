//! Command-line interface for Stratibreak.
//!
//! # Examples
//!
//! Analyze a project-state snapshot:
//!
//! ```bash
//! $ stratibreak analyze --state apollo.json --min-severity high
//! ```
//!
//! Summarize gaps exported from another tool:
//!
//! ```bash
//! $ stratibreak summarize --gaps export.json --format json
//! ```
//!
//! Check a snapshot without analysing it:
//!
//! ```bash
//! $ stratibreak validate --state apollo.json
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use stratibreak_core::{GapType, RawGap, SeverityLevel, Validate};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{StratibreakConfig, CONFIG_ENV};
use crate::request::{GapAnalysisRequest, GapAnalysisResponse, ProjectState};
use crate::service::GapAnalysisService;
use crate::source::{load_state_file, InMemoryStateSource};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "stratibreak", version, about = "Project gap analysis")]
pub struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

/// Output format for analysis results.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Actions available via CLI.
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Detect, prioritize and summarize gaps in a project-state snapshot
    Analyze {
        /// Project-state JSON file
        #[arg(long)]
        state: PathBuf,

        /// YAML config file
        #[arg(long, env = CONFIG_ENV)]
        config: Option<PathBuf>,

        /// Drop gaps below this severity
        #[arg(long)]
        min_severity: Option<SeverityLevel>,

        /// Keep only these gap types (repeatable)
        #[arg(long = "type")]
        types: Vec<GapType>,

        /// JSON output of a previous analysis, for trends
        #[arg(long)]
        baseline: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Categorize and summarize a JSON array of exported gaps
    Summarize {
        /// JSON file holding an array of gaps
        #[arg(long)]
        gaps: PathBuf,

        #[arg(long, env = CONFIG_ENV)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check a project-state snapshot and list field errors
    Validate {
        #[arg(long)]
        state: PathBuf,
    },
}

/// What a command printed and whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn ok(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

/// Installs the global subscriber; logs go to stderr so stdout stays parseable.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Entry point for the CLI.
pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    crate::init();

    let outcome = execute(cli.action).await?;
    print!("{}", outcome.output);

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs one action and returns what it would print.
pub async fn execute(action: Action) -> anyhow::Result<Outcome> {
    match action {
        Action::Analyze {
            state,
            config,
            min_severity,
            types,
            baseline,
            format,
        } => {
            let config = StratibreakConfig::load_or_default(config.as_deref())?;
            let state = load_state_file(&state)
                .await
                .with_context(|| format!("Failed to load state from {}", state.display()))?;

            let mut request = GapAnalysisRequest::new(state.project_id.clone());
            request.include_types = types;
            request.min_severity = min_severity;
            if let Some(path) = baseline {
                request.baseline_gaps = load_baseline(&path)?;
            }

            let source = Arc::new(InMemoryStateSource::with_states([state]));
            let service = GapAnalysisService::new(source, config)?;
            let response = service.analyze(&request).await?;

            Ok(Outcome::ok(render(&response, format)?))
        }

        Action::Summarize {
            gaps,
            config,
            format,
        } => {
            let config = StratibreakConfig::load_or_default(config.as_deref())?;
            let raw = std::fs::read_to_string(&gaps)
                .with_context(|| format!("Failed to read {}", gaps.display()))?;
            let raw: Vec<RawGap> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of gaps", gaps.display()))?;

            let service = GapAnalysisService::new(Arc::new(InMemoryStateSource::new()), config)?;
            let response = service
                .analyze_raw_gaps(raw)
                .with_context(|| format!("Failed to summarize {}", gaps.display()))?;

            let output = match format {
                OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&response.result)?),
                OutputFormat::Text => render_text(&response),
            };
            Ok(Outcome::ok(output))
        }

        Action::Validate { state } => {
            let state = load_state_file(&state)
                .await
                .with_context(|| format!("Failed to load state from {}", state.display()))?;
            Ok(validate_state(&state))
        }
    }
}

fn load_baseline(path: &Path) -> anyhow::Result<Vec<stratibreak_core::Gap>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read baseline {}", path.display()))?;
    let previous: GapAnalysisResponse = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a previous analysis", path.display()))?;
    Ok(previous.result.categorized.into_gaps())
}

fn validate_state(state: &ProjectState) -> Outcome {
    match state.validate() {
        Ok(()) => Outcome::ok(format!(
            "{}: valid ({} metrics)\n",
            state.project_id,
            state.metrics.len()
        )),
        Err(errors) => {
            let mut output = format!("{}: {} problems\n", state.project_id, errors.len());
            for err in &errors.errors {
                let _ = writeln!(output, "  {} [{}]: {}", err.field, err.code, err.message);
            }
            Outcome {
                output,
                success: false,
            }
        }
    }
}

fn render(response: &GapAnalysisResponse, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(response)?),
        OutputFormat::Text => render_text(response),
    })
}

/// Human-readable report.
pub fn render_text(response: &GapAnalysisResponse) -> String {
    let summary = &response.result.summary;
    let mut out = String::new();

    let source = response
        .source_tool
        .as_deref()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "Project {}{} analyzed at {}",
        response.project_id,
        source,
        response.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Gaps: {} total, {} critical, {} high, average confidence {:.2}",
        summary.total_gaps, summary.critical_gaps, summary.high_priority_gaps, summary.average_confidence
    );

    let name = |c: Option<GapType>| c.map(|c| c.as_str()).unwrap_or("none");
    let _ = writeln!(
        out,
        "Most affected: {}, least affected: {}",
        name(summary.most_affected_category),
        name(summary.least_affected_category)
    );

    if response.prioritized.is_empty() {
        out.push_str("\nNo gaps found.\n");
        return out;
    }

    out.push_str("\nPrioritized:\n");
    for (i, p) in response.prioritized.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. [{} {:.2}] {} {}: {}",
            i + 1,
            p.priority,
            p.score,
            p.gap.severity,
            p.gap.gap_type,
            p.gap.title
        );
    }

    out.push_str("\nCategories:\n");
    for (gap_type, gaps) in response.result.categorized.non_empty() {
        let Some(metrics) = response.result.metrics.get(&gap_type) else {
            continue;
        };
        let severities = metrics
            .by_severity
            .iter()
            .rev()
            .filter(|(_, n)| **n > 0)
            .map(|(s, n)| format!("{}={}", s, n))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "  {:<14} {:>3}  {}  conf={:.2}  cause={}  trend={}",
            gap_type.as_str(),
            gaps.len(),
            severities,
            metrics.average_confidence,
            metrics.primary_root_cause.map(|c| c.as_str()).unwrap_or("none"),
            metrics.trend.as_str()
        );
    }

    out
}
