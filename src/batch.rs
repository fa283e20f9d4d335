//! Run the budget gap calculation for every combination in an analysis.
//!
//! Each combination of region, scenario, year and carrier is calculated independently. The series
//! for the different carriers are then joined on import volume into one table per region, scenario
//! and year.
use crate::analysis::Analysis;
use crate::error::GapError;
use crate::gap::{BudgetGapPoint, compute_gap};
use crate::id::{CarrierID, RegionID, ScenarioID};
use indexmap::IndexMap;
use log::{info, warn};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a table of results
#[derive(PartialEq, Eq, Hash, Debug, Clone, PartialOrd, Ord)]
pub struct GapTableKey {
    /// The importing region
    pub region_id: RegionID,
    /// The demand scenario
    pub scenario_id: ScenarioID,
    /// The year
    pub year: u32,
}

impl fmt::Display for GapTableKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "region: {}, scenario: {}, year: {}",
            self.region_id, self.scenario_id, self.year
        )
    }
}

/// An import volume usable as an ordered map key
#[derive(Debug, Clone, Copy)]
struct VolumeKey(f64);

impl PartialEq for VolumeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VolumeKey {}

impl PartialOrd for VolumeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VolumeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Budget gap series for several carriers, outer-joined on import volume.
///
/// Each row holds one value per carrier, which is `None` if the carrier's series has no point at
/// that volume.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct GapTable {
    carriers: Vec<CarrierID>,
    rows: BTreeMap<VolumeKey, Vec<Option<f64>>>,
}

impl GapTable {
    /// Add a carrier's series as a new column
    pub fn join(&mut self, carrier_id: CarrierID, points: &[BudgetGapPoint]) {
        let num_columns = self.carriers.len();
        self.carriers.push(carrier_id);
        for row in self.rows.values_mut() {
            row.push(None);
        }

        for point in points {
            let row = self
                .rows
                .entry(VolumeKey(point.import_volume))
                .or_insert_with(|| vec![None; num_columns + 1]);
            row[num_columns] = Some(point.budget_gap);
        }
    }

    /// The carriers in column order
    pub fn carriers(&self) -> &[CarrierID] {
        &self.carriers
    }

    /// Iterate over rows of import volume and per-carrier gaps, in ascending order of volume
    pub fn iter_rows(&self) -> impl Iterator<Item = (f64, &[Option<f64>])> {
        self.rows
            .iter()
            .map(|(volume, gaps)| (volume.0, gaps.as_slice()))
    }

    /// Whether the table has no columns
    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }
}

/// A combination for which the calculation failed
#[derive(PartialEq, Debug, Clone)]
pub struct GapFailure {
    /// The table the result would have been part of
    pub key: GapTableKey,
    /// The carrier
    pub carrier_id: CarrierID,
    /// What went wrong
    pub error: GapError,
}

/// The results of a batch run
#[derive(PartialEq, Debug, Default)]
pub struct BatchResults {
    /// One table per region, scenario and year with at least one successful carrier
    pub tables: IndexMap<GapTableKey, GapTable>,
    /// Combinations which could not be calculated
    pub failures: Vec<GapFailure>,
}

/// Calculate the budget gap for every combination in the analysis.
///
/// A failed combination is logged and recorded; the remaining combinations are still calculated.
pub fn run_batch(analysis: &Analysis) -> BatchResults {
    let mut results = BatchResults::default();
    for (region_id, scenario_id, year) in analysis.iter_combinations() {
        let demand = analysis.demand_slice(&region_id, &scenario_id, year);
        let key = GapTableKey {
            region_id: region_id.clone(),
            scenario_id: scenario_id.clone(),
            year,
        };

        let mut table = GapTable::default();
        for carrier_id in analysis.iter_carriers() {
            let supply = analysis.supply_slice(carrier_id, year);
            match compute_gap(supply, demand.clone(), &analysis.parameters.gap) {
                Ok(points) => {
                    if let Some(last) = points.last() {
                        info!(
                            "{key}, carrier: {carrier_id}: budget gap {:.3} at import volume {}",
                            last.budget_gap, last.import_volume
                        );
                    } else {
                        warn!("{key}, carrier: {carrier_id}: no volume can be traded");
                    }
                    table.join(carrier_id.clone(), &points);
                }
                Err(error) => {
                    warn!("Skipping {key}, carrier: {carrier_id}: {error}");
                    results.failures.push(GapFailure {
                        key: key.clone(),
                        carrier_id: carrier_id.clone(),
                        error,
                    });
                }
            }
        }

        if !table.is_empty() {
            results.tables.insert(key, table);
        }
    }

    results
}
