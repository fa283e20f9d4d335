//! The command line interface for budget gap analyses.
use crate::analysis::Analysis;
use crate::batch::run_batch;
use crate::input::load_analysis;
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_results};
use crate::settings::Settings;
use crate::year::parse_year_str;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for budget gap analyses.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the `run` command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Import volume increment, overriding the value in `analysis.toml`
    #[arg(long)]
    pub step: Option<f64>,
    /// Years to analyse as a year string (e.g. "all", "2030;2050" or "2030..2050"), overriding
    /// the value in `analysis.toml`
    #[arg(long)]
    pub years: Option<String>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Calculate budget gaps for an analysis.
    Run {
        /// Path to the analysis directory.
        analysis_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Validate an analysis.
    Validate {
        /// The path to the analysis directory.
        analysis_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { analysis_dir, opts } => handle_run_command(&analysis_dir, &opts, None),
            Self::Validate { analysis_dir } => handle_validate_command(&analysis_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start budget-gap
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ budget-gap --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    if let Some(command) = cli.command {
        command.execute()?;
    } else {
        // No command provided. Show help.
        Cli::command().print_long_help()?;
    }

    Ok(())
}

/// Apply the command-line overrides for step and years to a loaded analysis
fn apply_run_opts(analysis: &mut Analysis, opts: &RunOpts) -> Result<()> {
    if let Some(step) = opts.step {
        analysis.parameters.gap.step = step;
    }
    if let Some(years) = &opts.years {
        analysis.parameters.years = parse_year_str(years, &analysis.demand_years())
            .with_context(|| format!("Invalid value for --years: {years}"))?;
    }

    analysis.parameters.validate()
}

/// Handle the `run` command.
pub fn handle_run_command(
    analysis_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let mut settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // These settings can be overridden by command-line arguments
    if opts.overwrite {
        settings.overwrite = true;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(analysis_path, settings.results_root)?;
        &pathbuf
    };

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path)).context("Failed to initialise logging.")?;

    info!("Starting budget-gap v{}", env!("CARGO_PKG_VERSION"));

    // Load the analysis to run
    let mut analysis = load_analysis(analysis_path).context("Failed to load analysis.")?;
    apply_run_opts(&mut analysis, opts).context("Invalid run options.")?;
    info!("Loaded analysis from {}", analysis_path.display());
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let results = run_batch(&analysis);
    let paths = write_results(output_path, &results)?;
    write_metadata(
        output_path,
        &analysis,
        results.tables.len(),
        results.failures.len(),
    )
    .context("Failed to write metadata.")?;

    info!("Wrote {} budget gap table(s)", paths.len());
    if !results.failures.is_empty() {
        warn!(
            "{} combination(s) could not be calculated. See failures.csv in the output folder.",
            results.failures.len()
        );
    }
    info!("Budget gap calculation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(analysis_path: &Path, settings: Option<Settings>) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    // Load/validate the analysis
    load_analysis(analysis_path).context("Failed to validate analysis.")?;
    info!("Analysis validation successful!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::analysis;
    use rstest::rstest;

    #[rstest]
    fn apply_run_opts_none(analysis: Analysis) {
        let mut modified = analysis.clone();
        apply_run_opts(&mut modified, &RunOpts::default()).unwrap();
        assert_eq!(modified, analysis);
    }

    #[rstest]
    fn apply_run_opts_step_and_years(mut analysis: Analysis) {
        let opts = RunOpts {
            step: Some(2.5),
            years: Some("all".into()),
            ..RunOpts::default()
        };
        apply_run_opts(&mut analysis, &opts).unwrap();
        assert_eq!(analysis.parameters.gap.step, 2.5);
        assert_eq!(analysis.parameters.years, [2050]);
    }

    #[rstest]
    #[case(RunOpts { step: Some(0.0), ..RunOpts::default() })]
    #[case(RunOpts { step: Some(f64::NAN), ..RunOpts::default() })]
    #[case(RunOpts { years: Some("2030".into()), ..RunOpts::default() })]
    fn apply_run_opts_invalid(mut analysis: Analysis, #[case] opts: RunOpts) {
        assert!(apply_run_opts(&mut analysis, &opts).is_err());
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
