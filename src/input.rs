//! Common routines for handling input data.
use crate::analysis::{Analysis, AnalysisParameters};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use log::info;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

mod demand;
use demand::read_demand;
mod supply;
use supply::read_supply;

/// Read a series of type `T`s from a CSV file.
///
/// Leading and trailing whitespace is trimmed from all fields and columns which `T` does not use
/// are ignored.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
///
/// # Returns
///
/// The rows of the file, or an error if the file could not be read or is empty.
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let rows: Vec<T> = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;
    ensure!(
        !rows.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(rows)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Check whether a slice is sorted in strictly ascending order
pub fn is_sorted_and_unique<T: PartialOrd>(values: &[T]) -> bool {
    values.iter().tuple_windows().all(|(a, b)| a < b)
}

/// Load an analysis from the specified directory.
///
/// # Arguments
///
/// * `analysis_dir` - Folder containing `analysis.toml` and the curve CSV files
///
/// # Returns
///
/// The analysis, or an error if any of the files are missing or invalid.
pub fn load_analysis<P: AsRef<Path>>(analysis_dir: P) -> Result<Analysis> {
    let analysis_dir = analysis_dir.as_ref();
    let demand = read_demand(analysis_dir)?;
    let available_years = crate::analysis::parameters::sorted_unique_years(
        demand.iter().map(|obs| obs.year),
    );
    let parameters = AnalysisParameters::from_path(analysis_dir, &available_years)?;
    let supply = read_supply(
        analysis_dir,
        &parameters.carriers,
        parameters.supply_volumes,
    )?;
    info!(
        "Read {} demand observations and supply curves for {} carrier(s)",
        demand.len(),
        supply.len()
    );

    Ok(Analysis {
        analysis_path: analysis_dir.to_path_buf(),
        parameters,
        demand,
        supply,
    })
}
