//! Read and validate analysis parameters from `analysis.toml`.
use crate::gap::GapParameters;
use crate::id::{CarrierID, RegionID, ScenarioID};
use crate::input::{input_err_msg, is_sorted_and_unique, read_toml};
use crate::year::parse_year_str;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use std::path::Path;

const ANALYSIS_PARAMETERS_FILE_NAME: &str = "analysis.toml";

/// How volumes in the supply tables should be interpreted
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SupplyVolumes {
    /// Each row is a block of capacity on top of the region's cheaper rows
    #[default]
    Incremental,
    /// Each row is a region's total export level at that price
    Cumulative,
}

/// The years to analyse, as written in `analysis.toml`.
///
/// Either a list of years or a year string (e.g. `"all"`, `"2030;2050"` or `"2030.."`) which is
/// resolved against the years present in the demand data.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum YearSelection {
    /// An explicit list of years
    Years(Vec<u32>),
    /// A year string
    Text(String),
}

impl YearSelection {
    /// Resolve into a list of years.
    ///
    /// # Arguments
    ///
    /// * `available_years` - Years for which there is demand data (sorted and unique)
    pub fn resolve(&self, available_years: &[u32]) -> Result<Vec<u32>> {
        match self {
            Self::Years(years) => {
                check_years(years)?;
                Ok(years.clone())
            }
            Self::Text(s) => parse_year_str(s, available_years),
        }
    }
}

/// The `analysis.toml` file before years are resolved
#[derive(Debug, Deserialize)]
struct AnalysisFile {
    regions: Vec<RegionID>,
    scenarios: Vec<ScenarioID>,
    years: YearSelection,
    carriers: Vec<CarrierID>,
    #[serde(flatten)]
    gap: GapParameters,
    #[serde(default)]
    supply_volumes: SupplyVolumes,
}

/// Analysis parameters as defined in the `analysis.toml` file.
#[derive(Debug, PartialEq, Clone)]
pub struct AnalysisParameters {
    /// Importing regions to analyse
    pub regions: Vec<RegionID>,
    /// Demand scenarios to analyse
    pub scenarios: Vec<ScenarioID>,
    /// Years to analyse, in order
    pub years: Vec<u32>,
    /// Transport carriers; there must be a supply table for each
    pub carriers: Vec<CarrierID>,
    /// Sweep step and unit conversion factors
    pub gap: GapParameters,
    /// How to interpret the volumes in the supply tables
    pub supply_volumes: SupplyVolumes,
}

/// Sort and deduplicate years
pub(crate) fn sorted_unique_years<I>(years: I) -> Vec<u32>
where
    I: IntoIterator<Item = u32>,
{
    years.into_iter().sorted().dedup().collect()
}

/// Check that a list of years is non-empty, sorted and unique
fn check_years(years: &[u32]) -> Result<()> {
    ensure!(!years.is_empty(), "`years` is empty");
    ensure!(
        is_sorted_and_unique(years),
        "`years` must be composed of unique values in order"
    );

    Ok(())
}

/// Check that a list of IDs is non-empty and contains no duplicates
fn check_ids<T: Eq + Hash>(ids: &[T], name: &str) -> Result<()> {
    ensure!(!ids.is_empty(), "`{name}` is empty");
    let unique: HashSet<_> = ids.iter().collect();
    ensure!(unique.len() == ids.len(), "`{name}` contains duplicate entries");

    Ok(())
}

impl AnalysisParameters {
    /// Read an analysis file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `analysis_dir` - Folder containing analysis configuration files
    /// * `available_years` - Years for which there is demand data (sorted and unique)
    ///
    /// # Returns
    ///
    /// The analysis parameters or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(
        analysis_dir: P,
        available_years: &[u32],
    ) -> Result<AnalysisParameters> {
        let file_path = analysis_dir.as_ref().join(ANALYSIS_PARAMETERS_FILE_NAME);
        let file: AnalysisFile = read_toml(&file_path)?;

        Self::from_file(file, available_years).with_context(|| input_err_msg(&file_path))
    }

    fn from_file(file: AnalysisFile, available_years: &[u32]) -> Result<AnalysisParameters> {
        let years = file
            .years
            .resolve(available_years)
            .context("Invalid value for years")?;
        let params = AnalysisParameters {
            regions: file.regions,
            scenarios: file.scenarios,
            years,
            carriers: file.carriers,
            gap: file.gap,
            supply_volumes: file.supply_volumes,
        };
        params.validate()?;

        Ok(params)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_ids(&self.regions, "regions")?;
        check_ids(&self.scenarios, "scenarios")?;
        check_ids(&self.carriers, "carriers")?;
        check_years(&self.years)?;
        self.gap.validate()?;

        Ok(())
    }
}
