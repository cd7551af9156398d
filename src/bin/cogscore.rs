//! cogscore CLI - Command-line interface for cogscore
//!
//! Commands:
//! - score: Score a survey response export (batch mode)
//! - decode: Score a single raw task log
//! - tasks: List the available task decoders
//! - plan: Print the default scoring plan

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cogscore::schema::{ResponseAdapter, TaskData};
use cogscore::types::ScoreReport;
use cogscore::{ResponseScorer, ScoringPlan, TaskKind, PRODUCER_NAME, SCORE_VERSION};

/// cogscore - Scoring engine for behavioral cognitive tasks
#[derive(Parser)]
#[command(name = "cogscore")]
#[command(version = SCORE_VERSION)]
#[command(about = "Score cognitive task logs into summary metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a survey response export (batch mode)
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Scoring plan JSON (defaults to the built-in plan)
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Score a single raw task log
    Decode {
        /// Task identifier (e.g. GoStop, SpatialSpan, TrailsAB)
        #[arg(short, long)]
        task: String,

        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Metric label (defaults to the task's label)
        #[arg(long)]
        label: Option<String>,

        /// Pretty-print the metrics
        #[arg(long)]
        pretty: bool,
    },

    /// List the available task decoders
    Tasks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default scoring plan
    Plan,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Detect JSON or NDJSON from the input
    Auto,
    /// JSON array of responses, or a {"responses": [...]} export
    Json,
    /// Newline-delimited JSON (one response per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one scored response per line)
    Ndjson,
    /// Full report as JSON
    Json,
    /// Pretty-printed report
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ScoreCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            plan,
            input_format,
            output_format,
        } => cmd_score(&input, &output, plan.as_deref(), input_format, output_format),

        Commands::Decode {
            task,
            input,
            label,
            pretty,
        } => cmd_decode(&task, &input, label.as_deref(), pretty),

        Commands::Tasks { json } => cmd_tasks(json),

        Commands::Plan => {
            println!("{}", ScoringPlan::default().to_json()?);
            Ok(())
        }
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    plan: Option<&Path>,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), ScoreCliError> {
    let scorer = match plan {
        Some(plan_path) => ResponseScorer::from_plan_json(&fs::read_to_string(plan_path)?)?,
        None => ResponseScorer::default(),
    };

    let input_data = read_input(input)?;
    let records = match input_format {
        InputFormat::Auto => ResponseAdapter::parse_document(&input_data)?,
        InputFormat::Json => ResponseAdapter::parse_array(&input_data)?,
        InputFormat::Ndjson => ResponseAdapter::parse_ndjson(&input_data)?,
    };

    if records.is_empty() {
        return Err(ScoreCliError::NoResponses);
    }

    let report = scorer.score_batch(&records);
    let output_data = format_output(&report, &output_format)?;

    if is_stdio(output) {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_decode(
    task: &str,
    input: &Path,
    label: Option<&str>,
    pretty: bool,
) -> Result<(), ScoreCliError> {
    let kind: TaskKind = task.parse()?;
    let data = TaskData::from_json_str(&read_input(input)?);
    let metrics = kind.decode(&data, label);

    if pretty {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        println!("{}", serde_json::to_string(&metrics)?);
    }
    Ok(())
}

fn cmd_tasks(json: bool) -> Result<(), ScoreCliError> {
    let tasks: Vec<TaskInfo> = TaskKind::ALL
        .iter()
        .map(|kind| TaskInfo {
            id: kind.id().to_string(),
            aliases: kind.aliases().map(str::to_string).collect(),
            default_label: kind.default_label().to_string(),
            metrics: kind.metric_keys(kind.default_label()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    println!("{} {} task decoders", PRODUCER_NAME, SCORE_VERSION);
    println!("=========================");
    for task in &tasks {
        println!();
        println!("{} (label: {})", task.id, task.default_label);
        println!("  ids:     {}", task.aliases.join(", "));
        println!("  metrics: {}", task.metrics.join(", "));
    }
    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(input: &Path) -> Result<String, ScoreCliError> {
    if !is_stdio(input) {
        return Ok(fs::read_to_string(input)?);
    }
    if atty::is(atty::Stream::Stdin) {
        return Err(ScoreCliError::NoInput);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn format_output(report: &ScoreReport, format: &OutputFormat) -> Result<String, ScoreCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for response in &report.responses {
                lines.push(serde_json::to_string(response)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
    }
}

// Error types

#[derive(Debug)]
enum ScoreCliError {
    Io(io::Error),
    Score(cogscore::ScoreError),
    Json(serde_json::Error),
    NoInput,
    NoResponses,
}

impl From<io::Error> for ScoreCliError {
    fn from(e: io::Error) -> Self {
        ScoreCliError::Io(e)
    }
}

impl From<cogscore::ScoreError> for ScoreCliError {
    fn from(e: cogscore::ScoreError) -> Self {
        ScoreCliError::Score(e)
    }
}

impl From<serde_json::Error> for ScoreCliError {
    fn from(e: serde_json::Error) -> Self {
        ScoreCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ScoreCliError> for CliError {
    fn from(e: ScoreCliError) -> Self {
        match e {
            ScoreCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ScoreCliError::Score(cogscore::ScoreError::UnknownTask(id)) => CliError {
                code: "UNKNOWN_TASK".to_string(),
                message: format!("Unknown task identifier: {}", id),
                hint: Some("Run 'cogscore tasks' for the list of task ids".to_string()),
            },
            ScoreCliError::Score(e) => CliError {
                code: "SCORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the response export and scoring plan".to_string()),
            },
            ScoreCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ScoreCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, expected piped input".to_string(),
                hint: Some("Pipe a file in or pass --input <path>".to_string()),
            },
            ScoreCliError::NoResponses => CliError {
                code: "NO_RESPONSES".to_string(),
                message: "No responses found in input".to_string(),
                hint: Some("Ensure the export is not empty".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct TaskInfo {
    id: String,
    aliases: Vec<String>,
    default_label: String,
    metrics: Vec<String>,
}
