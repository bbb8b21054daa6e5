//! `tr-redact`: redact a telemetry batch read as JSON.

mod error;
mod logging;

use clap::{Args, Parser, Subcommand};
use error::{CliError, ExitCode};
use logging::{init_logging, LogFormat, LogLevel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tr_redact::model::{Logs, Metrics, Traces};
use tr_redact::{RedactionConfig, RedactionEngine, RedactionSummary, TelemetryShape};
use tracing::{debug, info};

/// Telemetry redaction - strip or mask sensitive attribute values
#[derive(Parser)]
#[command(name = "tr-redact")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Minimum log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a redaction config
    Check(CheckArgs),

    /// Redact a trace batch
    Traces(RedactArgs),

    /// Redact a log batch
    Logs(RedactArgs),

    /// Redact a metric batch
    Metrics(RedactArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Config file (.yaml/.yml or .json)
    #[arg(long, env = "TR_REDACT_CONFIG")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct RedactArgs {
    /// Config file (.yaml/.yml or .json)
    #[arg(long, env = "TR_REDACT_CONFIG")]
    config: PathBuf,

    /// Input batch; `-` reads stdin
    #[arg(long, default_value = "-")]
    input: String,

    /// Output file; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the summary as JSON on stderr
    #[arg(long)]
    print_summary: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.log_level, cli.global.log_format);

    let result = match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Traces(args) => run_redact::<Traces>(args, TelemetryShape::Traces),
        Commands::Logs(args) => run_redact::<Logs>(args, TelemetryShape::Logs),
        Commands::Metrics(args) => run_redact::<Metrics>(args, TelemetryShape::Metrics),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            eprintln!("error: {}", err);
            err.exit_code()
        }
    };
    std::process::exit(exit_code.as_i32());
}

fn load_engine(path: &Path) -> Result<RedactionEngine, CliError> {
    let config_error = |source| CliError::Config {
        path: path.display().to_string(),
        source,
    };
    let config = RedactionConfig::load(path).map_err(config_error)?;
    RedactionEngine::new(&config).map_err(config_error)
}

fn run_check(args: &CheckArgs) -> Result<(), CliError> {
    let engine = load_engine(&args.config)?;
    debug!(summary = %engine.verbosity(), "config valid");
    println!("ok");
    Ok(())
}

/// A batch shape the CLI knows how to read, redact, and write.
trait Batch: DeserializeOwned + Serialize {
    fn redact(&mut self, engine: &RedactionEngine) -> RedactionSummary;
}

impl Batch for Traces {
    fn redact(&mut self, engine: &RedactionEngine) -> RedactionSummary {
        engine.redact_traces(self)
    }
}

impl Batch for Logs {
    fn redact(&mut self, engine: &RedactionEngine) -> RedactionSummary {
        engine.redact_logs(self)
    }
}

impl Batch for Metrics {
    fn redact(&mut self, engine: &RedactionEngine) -> RedactionSummary {
        engine.redact_metrics(self)
    }
}

fn run_redact<B: Batch>(args: &RedactArgs, shape: TelemetryShape) -> Result<(), CliError> {
    let engine = load_engine(&args.config)?;

    let raw = read_input(&args.input)?;
    let mut batch: B =
        serde_json::from_str(&raw).map_err(|source| CliError::Parse { shape, source })?;

    let summary = batch.redact(&engine);
    info!(
        shape = %shape,
        changes = summary.total_changes(),
        "batch redacted"
    );

    let out =
        serde_json::to_string_pretty(&batch).map_err(|source| CliError::Encode { shape, source })?;
    write_output(args.output.as_ref(), &out)?;

    if args.print_summary {
        // Counters are plain integers and string sets; serialisation cannot fail.
        let json = serde_json::to_string(&summary).unwrap_or_default();
        eprintln!("{}", json);
    }
    Ok(())
}

fn read_input(input: &str) -> Result<String, CliError> {
    let input_error = |source| CliError::Input {
        path: input.to_string(),
        source,
    };
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(input_error)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).map_err(input_error)
    }
}

fn write_output(output: Option<&PathBuf>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, format!("{}\n", content)).map_err(|source| {
            CliError::Output {
                path: path.display().to_string(),
                source,
            }
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content).map_err(|source| CliError::Output {
                path: "-".to_string(),
                source,
            })
        }
    }
}
