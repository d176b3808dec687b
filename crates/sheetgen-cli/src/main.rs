//! sheetgen CLI - XML to XLSX conversion tool

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use sheetgen::{
    ConversionReport, DocumentAssembler, LogConfig, LogLevel, RunConfig, RunContext, Strategy,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_OUTPUT: &str = "salida.xlsx";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "sheetgen")]
#[command(
    author,
    version,
    about = "Convert an XML cell description into a styled XLSX spreadsheet"
)]
struct Cli {
    /// Source XML document (or a configuration with a <data> section)
    input: PathBuf,

    /// Output spreadsheet, unless the source names one in <dataOut>
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Writer strategy: direct (can extend an existing file) or batched
    #[arg(short, long, default_value = "direct")]
    strategy: Strategy,

    /// Log level, overriding the source's <logLevel>
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = RunContext::new();

    println!(
        "Converting '{}' -> '{}'",
        cli.input.display(),
        cli.output.display()
    );
    println!("Start: {}", ctx.started_at().format(TIME_FORMAT));

    let result = run(&cli, &ctx);

    println!("End: {}", Local::now().format(TIME_FORMAT));
    println!("Elapsed: {:.2} s", ctx.elapsed().as_secs_f64());

    match result {
        Ok(report) => {
            for warning in &report.warnings {
                eprintln!("Warning: {}", warning);
            }
            println!(
                "Conversion succeeded: {} ({} sheets, {} cells, {})",
                report.output.display(),
                report.sheets.len(),
                report.cells_written(),
                report.mode
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            println!("Conversion failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, ctx: &RunContext) -> Result<ConversionReport> {
    let mut config = RunConfig::read(&cli.input)
        .with_context(|| format!("Failed to read '{}'", cli.input.display()))?;

    if let Some(level) = &cli.log_level {
        match LogLevel::parse(level) {
            Some(parsed) => {
                config.log.level = parsed;
                config.log.unknown_level = None;
            }
            None => config.log.unknown_level = Some(level.clone()),
        }
    }
    init_logging(&config.log, ctx)?;

    let (input, output) = config
        .resolve_locations(&cli.input, Some(&cli.output))
        .context("Failed to resolve input and output locations")?;
    if output != cli.output || input.path() != cli.input {
        println!(
            "Configured locations: '{}' -> '{}'",
            input.path().display(),
            output.display()
        );
    }

    let mut assembler = DocumentAssembler::new(cli.strategy);
    assembler
        .run(input.path(), &output, ctx)
        .with_context(|| format!("Failed to convert into '{}'", output.display()))
}

/// Install the global subscriber: `RUST_LOG` wins over the configured level
fn init_logging(log: &LogConfig, ctx: &RunContext) -> Result<()> {
    if let Some(level) = &log.unknown_level {
        eprintln!("Warning: unknown log level '{}', using INFO", level);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.level.as_filter()));

    let console = log
        .console_enabled()
        .then(|| fmt::layer().with_writer(std::io::stderr));

    let file = match &log.file {
        Some(log_file) => {
            let path = log_file.path(ctx);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory '{}'", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install logging")?;
    Ok(())
}
