use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glob::glob;
use ibf_core::{DecodeOptions, Report, analyze_record_files};
use tracing::debug;

mod logging;

const EXAMPLES: &str = "Examples:\n  ibf record decode record-0001.bin -o report.json\n  \
    ibf record analyze 'dump/*.bin' --stdout --pretty\n  \
    ibf record decode a.bin b.bin -o report.json --strict --list-errors";

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("IBF_BUILD_COMMIT"),
    " ",
    env!("IBF_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "ibf")]
#[command(version = VERSION)]
#[command(
    about = "Offline decoder for insulin-pump binary log records.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on raw log record windows.
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },
}

#[derive(Subcommand, Debug)]
enum RecordCommands {
    /// Decode record windows and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(after_help = EXAMPLES)]
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Record window files (one record per file); glob patterns allowed
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any record failed to decode
    #[arg(long)]
    strict: bool,

    /// Reject records whose declared size differs from the decoded size
    #[arg(long)]
    strict_size: bool,

    /// List decode errors after the report is produced
    #[arg(long)]
    list_errors: bool,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Record { command } => match command {
            RecordCommands::Decode(args) => {
                logging::init(args.verbose);
                cmd_record_decode(args)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_record_decode(args: DecodeArgs) -> Result<(), CliError> {
    let inputs = resolve_inputs(&args.inputs)?;
    for input in &inputs {
        validate_input_file(input)?;
    }
    if let Some(report_path) = args.report.as_ref() {
        ensure_report_differs(report_path, &inputs)?;
    }

    let options = if args.strict_size {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    };
    debug!(inputs = inputs.len(), ?options, "decoding record windows");

    let rep = analyze_record_files(&inputs, &options).context("record decoding failed")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match args.report.as_ref() {
        Some(report) if !args.stdout => {
            write_report(report, &json)?;
            if args.list_errors && !args.quiet {
                print_errors(&rep);
            }
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
        _ => {
            print!("{}", json);
            if args.list_errors && !args.quiet {
                print_errors(&rep);
            }
        }
    }

    if args.strict && rep.summary.failed > 0 {
        return Err(CliError::new(
            format!(
                "{} of {} records failed to decode",
                rep.summary.failed, rep.summary.records_total
            ),
            Some("use --list-errors to inspect".to_string()),
        ));
    }
    Ok(())
}

fn write_report(report: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;
    Ok(())
}

fn ensure_report_differs(report_path: &Path, inputs: &[PathBuf]) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain any input.
    let Ok(report_dir) = fs::canonicalize(report_dir) else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    let report_target = report_dir.join(file_name);

    for input in inputs {
        let input_abs = fs::canonicalize(input)
            .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
        if report_target == input_abs {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_errors(rep: &Report) {
    let failed: Vec<_> = rep
        .records
        .iter()
        .filter_map(|entry| entry.error.as_ref().map(|error| (&entry.source, error)))
        .collect();
    if failed.is_empty() {
        return;
    }
    eprintln!("Decode errors:");
    for (source, error) in failed {
        eprintln!("  {} {}", source, error.id);
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass one record window file per input".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass one record window file per input".to_string()),
        ));
    }
    Ok(())
}

fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut resolved = Vec::with_capacity(inputs.len());
    for input in inputs {
        let pattern = input.to_string_lossy();
        if is_glob_pattern(&pattern) {
            resolved.extend(expand_pattern(&pattern)?);
        } else {
            resolved.push(input.clone());
        }
    }
    Ok(resolved)
}

fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let paths = glob(pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    matches.sort();
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
