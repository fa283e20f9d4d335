//! Write run and program metadata to a TOML file.
//!
//! The metadata records which analysis was run, when, with which parameters and by which version
//! of the program. It is written as `metadata.toml` in the output directory.
use crate::analysis::{Analysis, SupplyVolumes};
use crate::id::{CarrierID, RegionID, ScenarioID};
use anyhow::Result;
use chrono::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output filename used for metadata.
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Top-level metadata structure serialized to TOML.
#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    parameters: ParameterMetadata<'a>,
    program: ProgramMetadata,
}

/// Information about the run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the analysis which was run
    analysis_path: &'a Path,
    /// The date and time on which the run started
    datetime: String,
    /// The number of results tables written
    num_tables: usize,
    /// The number of combinations which could not be calculated
    num_failures: usize,
}

/// The parameters used for the run, after command-line overrides
#[derive(Serialize)]
struct ParameterMetadata<'a> {
    regions: &'a [RegionID],
    scenarios: &'a [ScenarioID],
    years: &'a [u32],
    carriers: &'a [CarrierID],
    step: f64,
    unit_scale: f64,
    billion_scale: f64,
    supply_volumes: SupplyVolumes,
}

#[derive(Serialize)]
struct ProgramMetadata {
    /// The program name
    name: &'static str,
    /// The program version as specified in Cargo.toml
    version: &'static str,
    /// Whether it is a debug build
    is_debug: bool,
}

impl Default for ProgramMetadata {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            is_debug: cfg!(debug_assertions),
        }
    }
}

/// Write metadata to `metadata.toml` in the given output directory.
///
/// # Arguments
///
/// * `output_path` - Directory where `metadata.toml` will be written.
/// * `analysis` - The analysis that was run.
/// * `num_tables` - The number of results tables written.
/// * `num_failures` - The number of combinations which failed.
///
/// # Errors
///
/// Returns an error if serializing the metadata or writing the file fails.
pub fn write_metadata(
    output_path: &Path,
    analysis: &Analysis,
    num_tables: usize,
    num_failures: usize,
) -> Result<()> {
    let parameters = &analysis.parameters;
    let metadata = Metadata {
        run: RunMetadata {
            analysis_path: &analysis.analysis_path,
            datetime: Local::now().to_rfc2822(),
            num_tables,
            num_failures,
        },
        parameters: ParameterMetadata {
            regions: &parameters.regions,
            scenarios: &parameters.scenarios,
            years: &parameters.years,
            carriers: &parameters.carriers,
            step: parameters.gap.step,
            unit_scale: parameters.gap.unit_scale,
            billion_scale: parameters.gap.billion_scale,
            supply_volumes: parameters.supply_volumes,
        },
        program: ProgramMetadata::default(),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::analysis;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn write_metadata_works(analysis: Analysis) {
        let dir = tempdir().unwrap();
        write_metadata(dir.path(), &analysis, 1, 0).unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let metadata: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(metadata["run"]["analysis_path"].as_str(), Some("analysis"));
        assert_eq!(metadata["run"]["num_tables"].as_integer(), Some(1));
        assert_eq!(metadata["parameters"]["step"].as_float(), Some(5.0));
        assert_eq!(
            metadata["parameters"]["supply_volumes"].as_str(),
            Some("incremental")
        );
        assert_eq!(
            metadata["program"]["name"].as_str(),
            Some(env!("CARGO_PKG_NAME"))
        );
    }
}
