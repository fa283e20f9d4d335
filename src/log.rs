//! The `log` module provides initialisation and configuration of the application's logging system.
//!
//! Messages at `warn` level and above go to stderr and everything else goes to stdout. When an
//! output directory is supplied, messages are also written to log files there.
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Level, LevelFilter, Record};
use std::env;
use std::fmt::Arguments;
use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the `BUDGET_GAP_LOG_LEVEL`
/// environment variable or the settings file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable used to override the log level
const LOG_LEVEL_ENV_VAR: &str = "BUDGET_GAP_LOG_LEVEL";

/// The file name for the log file containing messages about the ordinary operation of the program
const LOG_INFO_FILE_NAME: &str = "budget_gap_info.log";

/// The file name for the log file containing debug and info messages
const LOG_DEBUG_FILE_NAME: &str = "budget_gap_debug.log";

/// Used to indicate whether the logger has already been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Parse a log level from a string, ignoring case
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(log_level).map_err(|_| anyhow!("Unknown log level: {log_level}"))
}

/// Initialise the program logger using the `fern` logging library with colourised output.
///
/// The user can override the log level with the `BUDGET_GAP_LOG_LEVEL` environment variable. If
/// the logger has already been initialised, this function does nothing.
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in the program settings
/// * `log_file_path`: The folder to save log files to, if any
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    if is_logger_initialised() {
        return Ok(());
    }

    // The environment variable takes precedence over the settings file
    let log_level = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| log_level_from_settings.into());
    let log_level = parse_log_level(&log_level)?;

    // Only colourise output if it is going to a terminal
    let use_colour_stdout = std::io::stdout().is_terminal();
    let use_colour_stderr = std::io::stderr().is_terminal();

    let stdout_dispatch = Dispatch::new()
        .filter(|metadata| metadata.level() > Level::Warn)
        .format(move |out, message, record| {
            write_log_colour(out, message, record, use_colour_stdout);
        })
        .level(log_level)
        .chain(std::io::stdout());
    let stderr_dispatch = Dispatch::new()
        .filter(|metadata| metadata.level() <= Level::Warn)
        .format(move |out, message, record| {
            write_log_colour(out, message, record, use_colour_stderr);
        })
        .level(log_level)
        .chain(std::io::stderr());
    let mut dispatch = Dispatch::new().chain(stdout_dispatch).chain(stderr_dispatch);

    if let Some(log_file_path) = log_file_path {
        let info_file = log_file_path.join(LOG_INFO_FILE_NAME);
        let debug_file = log_file_path.join(LOG_DEBUG_FILE_NAME);
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .format(write_log_plain)
                    .level(LevelFilter::Info)
                    .chain(fern::log_file(&info_file).with_context(|| {
                        format!("Could not create log file {}", info_file.display())
                    })?),
            )
            .chain(
                Dispatch::new()
                    .format(write_log_plain)
                    .level(LevelFilter::Debug)
                    .chain(fern::log_file(&debug_file).with_context(|| {
                        format!("Could not create log file {}", debug_file.display())
                    })?),
            );
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT.get_or_init(|| ());

    Ok(())
}

/// Write a log message without colours, used for log files
fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    out.finish(format_args!(
        "[{} {}] {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        message
    ));
}

/// Write a log message to the terminal, colourising the level if requested
fn write_log_colour(out: FormatCallback, message: &Arguments, record: &Record, use_colour: bool) {
    let timestamp = Local::now().format("%H:%M:%S");
    if !use_colour {
        out.finish(format_args!("[{timestamp} {}] {message}", record.level()));
        return;
    }

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    out.finish(format_args!(
        "[{timestamp} {}] {message}",
        colours.color(record.level())
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("error", LevelFilter::Error)]
    #[case("warn", LevelFilter::Warn)]
    #[case("info", LevelFilter::Info)]
    #[case("DEBUG", LevelFilter::Debug)]
    #[case("Trace", LevelFilter::Trace)]
    fn parse_log_level_valid(#[case] level: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_log_level(level).unwrap(), expected);
    }

    #[test]
    fn parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn default_log_level_is_valid() {
        assert_eq!(
            parse_log_level(DEFAULT_LOG_LEVEL).unwrap(),
            LevelFilter::Info
        );
    }
}
