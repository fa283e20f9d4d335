//! The module responsible for writing output data to disk.
use crate::batch::{BatchResults, GapFailure, GapTable, GapTableKey};
use anyhow::{Context, Result, ensure};
use csv::Writer;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The output file name for combinations which could not be calculated
const FAILURES_FILE_NAME: &str = "failures.csv";

/// Get the default output directory for the analysis at the specified path
///
/// # Arguments
///
/// * `analysis_dir` - Folder containing the analysis
/// * `results_root` - Folder in which results for all analyses are stored
pub fn get_output_dir(analysis_dir: &Path, results_root: PathBuf) -> Result<PathBuf> {
    // Get the analysis name from the dir path. This ends up being convoluted because we need to
    // check for all possible errors. Ugh.
    let analysis_dir = analysis_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to analysis")?;

    let analysis_name = analysis_dir
        .file_name()
        .context("Analysis cannot be in root folder")?
        .to_str()
        .context("Invalid chars in analysis dir name")?;

    Ok([results_root, analysis_name.into()].iter().collect())
}

/// Create a new output directory, if it doesn't already exist.
///
/// If the directory exists and is not empty, it is only reused when `allow_overwrite` is true, in
/// which case its contents are deleted.
///
/// # Returns
///
/// True if an existing non-empty directory will be overwritten, false otherwise.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let is_non_empty = output_dir.is_dir() && output_dir.read_dir()?.next().is_some();
    if is_non_empty {
        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete it, choose a \
            different folder or use the --overwrite option."
        );
        fs::remove_dir_all(output_dir)?;
    }

    fs::create_dir_all(output_dir)?;

    Ok(is_non_empty)
}

/// The file name for a results table
fn table_file_name(key: &GapTableKey) -> String {
    format!(
        "{}_budget_gap_{}_{}.csv",
        key.region_id, key.scenario_id, key.year
    )
}

/// Format an optional value for a CSV field, leaving missing values empty
fn format_value(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

/// Write a results table to a CSV file in the output directory.
///
/// The table has an `import_volume` column followed by one `budget_gap_<carrier>` column per
/// carrier.
///
/// # Returns
///
/// The path to the file written.
pub fn write_gap_table(output_dir: &Path, key: &GapTableKey, table: &GapTable) -> Result<PathBuf> {
    let file_path = output_dir.join(table_file_name(key));
    let mut writer = Writer::from_path(&file_path)?;

    let header = ["import_volume".to_string()].into_iter().chain(
        table
            .carriers()
            .iter()
            .map(|carrier_id| format!("budget_gap_{carrier_id}")),
    );
    writer.write_record(header)?;
    for (volume, gaps) in table.iter_rows() {
        let record = [volume.to_string()]
            .into_iter()
            .chain(gaps.iter().copied().map(format_value));
        writer.write_record(record)?;
    }
    writer.flush()?;

    Ok(file_path)
}

/// Write the list of failed combinations to a CSV file in the output directory
fn write_failures(output_dir: &Path, failures: &[GapFailure]) -> Result<()> {
    let file_path = output_dir.join(FAILURES_FILE_NAME);
    let mut writer = Writer::from_path(&file_path)?;
    writer.write_record(["region", "scenario", "year", "carrier", "error"])?;
    for failure in failures {
        writer.write_record([
            failure.key.region_id.to_string(),
            failure.key.scenario_id.to_string(),
            failure.key.year.to_string(),
            failure.carrier_id.to_string(),
            failure.error.to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

/// Write all results of a batch run to the output directory.
///
/// # Returns
///
/// The paths of the results tables written.
pub fn write_results(output_dir: &Path, results: &BatchResults) -> Result<Vec<PathBuf>> {
    let paths = results
        .tables
        .iter()
        .map(|(key, table)| {
            write_gap_table(output_dir, key, table)
                .with_context(|| format!("Failed to write results for {key}"))
        })
        .try_collect()?;

    if !results.failures.is_empty() {
        write_failures(output_dir, &results.failures)
            .context("Failed to write list of failed combinations")?;
    }

    Ok(paths)
}
