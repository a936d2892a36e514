//! rowdupe - duplicate row analysis for CSV data
//!
//! Groups the rows of a table by the values of a chosen column subset (or all
//! columns), exports a capped number of exemplars for every duplicate pattern
//! followed by every unique row, and annotates each exported row with the
//! total number of times its pattern occurs.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod signal;
pub mod table;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{AnalyzeArgs, Cli, Commands, ConfigArgs, ReportFormat};
use crate::config::Config;
use crate::duplicates::DuplicateAnalyzer;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextSummary, WriteOutcome};
use crate::progress::{Progress, ProgressCallback};
use crate::table::TableReader;

/// Rows between progress updates during grouping.
const PROGRESS_INTERVAL: usize = 1024;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for unreadable input, unknown columns, invalid
/// configuration, export failures, or an interrupted run. Use
/// [`ExitCode::for_error`] to pick the process exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Analyze(ref args) => run_analyze(args, &cli),
        Commands::Config(ref args) => run_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::try_load_from_path(path),
        None => Config::try_load(),
    }
}

fn run_analyze(args: &AnalyzeArgs, cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut config = load_config(args.config.as_deref())?;
    config.apply_cli(args);
    config.validate().context("Invalid settings")?;

    let handler = signal::install_handler()?;
    let show_progress = config.progress && !cli.quiet;
    let progress: Option<Arc<dyn ProgressCallback>> = show_progress
        .then(|| Arc::new(Progress::with_accessible(false, cli.no_color)) as Arc<dyn ProgressCallback>);

    let mut reader_options = config.reader_options().with_shutdown_flag(handler.get_flag());
    if let Some(ref progress) = progress {
        reader_options = reader_options.with_progress_callback(Arc::clone(progress));
    }
    let table = TableReader::new(reader_options)
        .read_path(&args.path)
        .with_context(|| format!("Failed to load {}", args.path.display()))?;

    let mut analyzer_config = config
        .analyzer_config()
        .with_shutdown_flag(handler.get_flag())
        .with_progress_interval(PROGRESS_INTERVAL);
    if let Some(progress) = progress {
        analyzer_config = analyzer_config.with_progress_callback(progress);
    }
    let analysis = DuplicateAnalyzer::new(analyzer_config).analyze(&table)?;

    let outcome = CsvOutput::new(&analysis.output)
        .with_delimiter(config.delimiter_byte())
        .write_path(&config.output)?;

    let exit_code = match outcome {
        WriteOutcome::Skipped => ExitCode::EmptyOutput,
        WriteOutcome::Written { .. } if analysis.has_duplicates() => ExitCode::Success,
        WriteOutcome::Written { .. } => ExitCode::NoDuplicates,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.report {
        ReportFormat::Json => JsonOutput::new(&analysis, exit_code).write_to(&mut out)?,
        ReportFormat::Text if !cli.quiet => {
            let mut summary = TextSummary::new(&analysis).with_color(!cli.no_color);
            if args.debug {
                summary = summary.with_debug(&table, config.debug_sample_rows);
            }
            summary.write_to(&mut out)?;
            summary.write_export(&mut out, &outcome)?;
        }
        ReportFormat::Text => {}
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_config(args: &ConfigArgs) -> anyhow::Result<ExitCode> {
    let path = match args.config {
        Some(ref path) => path.clone(),
        None => Config::config_path()?,
    };

    if args.init {
        if path.exists() && !args.force {
            anyhow::bail!(
                "Configuration file {} already exists (use --force to overwrite)",
                path.display()
            );
        }
        Config::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(ExitCode::Success);
    }

    let config = Config::try_load_from_path(&path)?;
    println!("# {}", path.display());
    print!("{}", config.to_toml_string()?);
    Ok(ExitCode::Success)
}
