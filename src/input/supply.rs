//! Code for reading supply curve tables, one per carrier.
use super::{input_err_msg, read_csv};
use crate::analysis::{SupplyMap, SupplyVolumes};
use crate::id::CarrierID;
use crate::supply::{SupplyObservation, to_incremental_blocks};
use anyhow::{Context, Result, ensure};
use log::debug;
use std::path::{Path, PathBuf};

/// Get the path to the supply table for a carrier
fn supply_file_path(analysis_dir: &Path, carrier_id: &CarrierID) -> PathBuf {
    analysis_dir.join(format!("supply_curve_{carrier_id}.csv"))
}

/// Read the supply tables for all carriers from the analysis directory.
///
/// # Arguments
///
/// * `analysis_dir` - Folder containing analysis configuration files
/// * `carrier_ids` - The carriers to read supply tables for
/// * `supply_volumes` - Whether the volumes in the tables are incremental or cumulative
///
/// # Returns
///
/// Supply observations as incremental blocks, keyed by carrier.
pub fn read_supply(
    analysis_dir: &Path,
    carrier_ids: &[CarrierID],
    supply_volumes: SupplyVolumes,
) -> Result<SupplyMap> {
    carrier_ids
        .iter()
        .map(|carrier_id| -> Result<_> {
            let file_path = supply_file_path(analysis_dir, carrier_id);
            let supply = read_csv(&file_path)?;
            let supply = process_supply(supply, supply_volumes)
                .with_context(|| input_err_msg(&file_path))?;
            debug!("Read {} supply blocks for {carrier_id}", supply.len());

            Ok((carrier_id.clone(), supply))
        })
        .collect()
}

/// Validate supply observations and convert them to incremental blocks if needed
fn process_supply(
    supply: Vec<SupplyObservation>,
    supply_volumes: SupplyVolumes,
) -> Result<Vec<SupplyObservation>> {
    for obs in &supply {
        ensure!(
            obs.import_volume.is_finite() && obs.import_volume >= 0.0,
            "Import volume must be a finite number greater than or equal to zero \
            (region: {}, year: {}, price: {})",
            obs.region_id,
            obs.year,
            obs.price
        );
        ensure!(
            obs.price.is_finite(),
            "Price must be a finite number (region: {}, year: {})",
            obs.region_id,
            obs.year
        );
    }

    Ok(match supply_volumes {
        SupplyVolumes::Incremental => supply,
        SupplyVolumes::Cumulative => to_incremental_blocks(&supply),
    })
}
