//! Common functionality for budget-gap.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod analysis;
pub mod batch;
pub mod cli;
pub mod demand;
pub mod error;
pub mod gap;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod settings;
pub mod supply;
pub mod year;

#[cfg(test)]
mod fixture;

/// URL of the issue tracker for reporting bugs
pub const ISSUES_URL: &str = "https://github.com/budget-gap/budget-gap/issues";

/// Get the path to the directory containing the program's config files.
///
/// # Panics
///
/// If the platform does not provide a config directory.
pub fn get_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().expect("Could not determine config directory for platform");
    path.push("budget-gap");
    path
}
