//! Code related to CLI commands for managing the settings file.
use crate::settings::{Settings, get_settings_file_path};
use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;

/// The available subcommands for managing the settings file.
#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show the contents of the settings file, if it exists.
    Show,
    /// Show the default settings file contents.
    ShowDefault,
    /// Print the path to the settings file.
    Path,
}

impl SettingsSubcommands {
    /// Execute the supplied settings subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Show => handle_show_command()?,
            Self::ShowDefault => handle_show_default_command(),
            Self::Path => handle_path_command(),
        }

        Ok(())
    }
}

/// Handle the `settings show` command.
fn handle_show_command() -> Result<()> {
    let file_path = get_settings_file_path();
    if !file_path.is_file() {
        println!("No settings file found at {}", file_path.display());
        return Ok(());
    }

    let contents = fs::read_to_string(&file_path)
        .with_context(|| format!("Could not read {}", file_path.display()))?;
    print!("{contents}");

    Ok(())
}

/// Handle the `settings show-default` command.
fn handle_show_default_command() {
    print!("{}", Settings::default_file_contents());
}

/// Handle the `settings path` command.
fn handle_path_command() {
    println!("{}", get_settings_file_path().display());
}
