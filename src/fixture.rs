//! Fixtures for tests

use crate::analysis::{Analysis, AnalysisParameters, SupplyVolumes};
use crate::demand::DemandObservation;
use crate::gap::GapParameters;
use crate::supply::SupplyObservation;
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

pub fn demand_observation(
    region: &str,
    scenario: &str,
    year: u32,
    import_volume: f64,
    price: f64,
) -> DemandObservation {
    DemandObservation {
        region_id: region.into(),
        scenario_id: scenario.into(),
        year,
        import_volume,
        price,
    }
}

pub fn supply_observation(
    region: &str,
    year: u32,
    import_volume: f64,
    price: f64,
) -> SupplyObservation {
    SupplyObservation {
        region_id: region.into(),
        year,
        import_volume,
        price,
    }
}

/// Demand with volumes [10, 20, 30] and prices [5, 8, 12]
#[fixture]
pub fn demand_slice() -> Vec<DemandObservation> {
    vec![
        demand_observation("EU", "S", 2050, 10.0, 5.0),
        demand_observation("EU", "S", 2050, 20.0, 8.0),
        demand_observation("EU", "S", 2050, 30.0, 12.0),
    ]
}

/// Demand falling from 100 at volume 5 to 40 at volume 20
#[fixture]
pub fn demand_observations() -> Vec<DemandObservation> {
    vec![
        demand_observation("EU", "S", 2050, 5.0, 100.0),
        demand_observation("EU", "S", 2050, 20.0, 40.0),
    ]
}

/// Two blocks of 10 at prices 50 and 80 (given in reverse merit order)
#[fixture]
pub fn supply_slice() -> Vec<SupplyObservation> {
    vec![
        supply_observation("Morocco", 2050, 10.0, 80.0),
        supply_observation("Egypt", 2050, 10.0, 50.0),
    ]
}

#[fixture]
pub fn analysis_parameters() -> AnalysisParameters {
    AnalysisParameters {
        regions: vec!["EU".into()],
        scenarios: vec!["S".into()],
        years: vec![2050],
        carriers: vec!["LH2".into(), "NH3".into()],
        gap: GapParameters {
            step: 5.0,
            ..GapParameters::default()
        },
        supply_volumes: SupplyVolumes::Incremental,
    }
}

/// An analysis with the same demand for two carriers, one of which has cheaper supply
#[fixture]
pub fn analysis(
    analysis_parameters: AnalysisParameters,
    demand_observations: Vec<DemandObservation>,
    supply_slice: Vec<SupplyObservation>,
) -> Analysis {
    let cheap_supply = vec![
        supply_observation("Egypt", 2050, 5.0, 30.0),
        supply_observation("Kenya", 2050, 5.0, 40.0),
    ];

    Analysis {
        analysis_path: "analysis".into(),
        parameters: analysis_parameters,
        demand: demand_observations,
        supply: indexmap! {
            "LH2".into() => supply_slice,
            "NH3".into() => cheap_supply,
        },
    }
}
