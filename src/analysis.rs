//! The analysis represents the input data provided by the user: curves and the combinations to
//! evaluate.
use crate::demand::DemandObservation;
use crate::id::{CarrierID, RegionID, ScenarioID};
use crate::supply::SupplyObservation;
use indexmap::IndexMap;
use itertools::iproduct;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::{AnalysisParameters, SupplyVolumes, YearSelection};

/// A map of supply observations, keyed by carrier
pub type SupplyMap = IndexMap<CarrierID, Vec<SupplyObservation>>;

/// Analysis definition
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Path to analysis folder
    pub analysis_path: PathBuf,
    /// Parameters from the analysis TOML file
    pub parameters: AnalysisParameters,
    /// Demand observations for all regions, scenarios and years
    pub demand: Vec<DemandObservation>,
    /// Supply observations (as incremental blocks) for each carrier
    pub supply: SupplyMap,
}

impl Analysis {
    /// Iterate over every combination of region, scenario and year to analyse.
    pub fn iter_combinations(&self) -> impl Iterator<Item = (RegionID, ScenarioID, u32)> + '_ {
        let params = &self.parameters;
        iproduct!(&params.regions, &params.scenarios, &params.years)
            .map(|(region_id, scenario_id, year)| (region_id.clone(), scenario_id.clone(), *year))
    }

    /// Iterate over the carriers to analyse
    pub fn iter_carriers(&self) -> impl Iterator<Item = &CarrierID> {
        self.parameters.carriers.iter()
    }

    /// Demand observations for one region, scenario and year
    pub fn demand_slice<'a>(
        &'a self,
        region_id: &'a RegionID,
        scenario_id: &'a ScenarioID,
        year: u32,
    ) -> impl Iterator<Item = &'a DemandObservation> + Clone {
        self.demand
            .iter()
            .filter(move |obs| obs.matches(region_id, scenario_id, year))
    }

    /// Supply observations for one carrier and year.
    ///
    /// Empty if there is no supply data for the carrier.
    pub fn supply_slice<'a>(
        &'a self,
        carrier_id: &CarrierID,
        year: u32,
    ) -> impl Iterator<Item = &'a SupplyObservation> + Clone {
        self.supply
            .get(carrier_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(move |obs| obs.year == year)
    }

    /// All years for which there is demand data, in order
    pub fn demand_years(&self) -> Vec<u32> {
        parameters::sorted_unique_years(self.demand.iter().map(|obs| obs.year))
    }
}
