//! Code for reading the demand curve table.
use super::{input_err_msg, read_csv};
use crate::demand::DemandObservation;
use anyhow::{Context, Result, ensure};
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand_curve.csv";

/// Read the demand curve table from the analysis directory.
///
/// # Arguments
///
/// * `analysis_dir` - Folder containing analysis configuration files
///
/// # Returns
///
/// Demand observations for all regions, scenarios and years, in file order.
pub fn read_demand(analysis_dir: &Path) -> Result<Vec<DemandObservation>> {
    let file_path = analysis_dir.join(DEMAND_FILE_NAME);
    let demand = read_csv(&file_path)?;
    validate_demand(&demand).with_context(|| input_err_msg(&file_path))?;

    Ok(demand)
}

fn validate_demand(demand: &[DemandObservation]) -> Result<()> {
    for obs in demand {
        ensure!(
            obs.import_volume.is_finite() && obs.import_volume >= 0.0,
            "Import volume must be a finite number greater than or equal to zero \
            (region: {}, scenario: {}, year: {}, price: {})",
            obs.region_id,
            obs.scenario_id,
            obs.year,
            obs.price
        );
        ensure!(
            obs.price.is_finite(),
            "Price must be a finite number (region: {}, scenario: {}, year: {})",
            obs.region_id,
            obs.scenario_id,
            obs.year
        );
    }

    Ok(())
}
