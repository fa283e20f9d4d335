//! Integrate the difference between supply and demand prices over import volume.
use crate::demand::{DemandCurve, DemandObservation};
use crate::error::GapError;
use crate::supply::{MarginalSupplyCurve, SupplyObservation};
use log::debug;
use serde::{Deserialize, Serialize};

/// Tolerance for floating-point drift when stepping up to the maximum volume
const VOLUME_TOLERANCE: f64 = 1e-9;

/// Parameters controlling the volume sweep
#[derive(PartialEq, Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct GapParameters {
    /// Increment of import volume between points (e.g. in TWh)
    pub step: f64,
    /// Converts price x volume into money (e.g. EUR/MWh x TWh into EUR)
    pub unit_scale: f64,
    /// Converts the cumulative gap into the reporting unit (e.g. EUR into billion EUR)
    pub billion_scale: f64,
}

impl Default for GapParameters {
    fn default() -> Self {
        Self {
            step: 1.0,
            unit_scale: 1e6,
            billion_scale: 1e9,
        }
    }
}

impl GapParameters {
    /// Check that all parameters are positive and finite
    pub fn validate(&self) -> Result<(), GapError> {
        for (name, value) in [
            ("step", self.step),
            ("unit_scale", self.unit_scale),
            ("billion_scale", self.billion_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GapError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }
}

/// The cumulative budget gap at a given import volume
#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
pub struct BudgetGapPoint {
    /// Import volume
    pub import_volume: f64,
    /// Gap accumulated from zero up to `import_volume`, in reporting units
    pub budget_gap: f64,
}

/// Calculate the cumulative budget gap between a supply and a demand curve.
///
/// Import volume is swept from `step` up to the smaller of total supply and maximum observed
/// demand. At each step the gap between the marginal supply price and the demand price, scaled by
/// the step size, is added to a running total.
///
/// # Arguments
///
/// * `supply` - Supply observations for one year
/// * `demand` - Demand observations for one region, scenario and year
/// * `parameters` - Sweep step and unit conversion factors
///
/// # Returns
///
/// One point per step in ascending order of volume, or the first error encountered.
pub fn compute_gap<'a, 'b, S, D>(
    supply: S,
    demand: D,
    parameters: &GapParameters,
) -> Result<Vec<BudgetGapPoint>, GapError>
where
    S: IntoIterator<Item = &'a SupplyObservation>,
    D: IntoIterator<Item = &'b DemandObservation>,
{
    parameters.validate()?;
    let supply_curve = MarginalSupplyCurve::build(supply)?;
    let demand_curve = DemandCurve::new(demand)?;
    sweep(&supply_curve, &demand_curve, parameters)
}

/// Sweep over import volume for already-built curves.
///
/// `parameters` must have been validated.
fn sweep(
    supply_curve: &MarginalSupplyCurve,
    demand_curve: &DemandCurve,
    parameters: &GapParameters,
) -> Result<Vec<BudgetGapPoint>, GapError> {
    let max_supply = supply_curve.total_volume();
    let max_demand = demand_curve.max_volume();
    let max_volume = max_supply.min(max_demand);
    debug!(
        "Sweeping import volume: max supply {max_supply}, max demand {max_demand}, step {}",
        parameters.step
    );

    let GapParameters {
        step,
        unit_scale,
        billion_scale,
    } = *parameters;

    let mut points = Vec::new();
    let mut cumulative = 0.0;
    let mut volume = step;
    while volume <= max_volume + VOLUME_TOLERANCE {
        // The tolerance may take us fractionally past the end of the supply curve
        let supply_price = supply_curve.price_at(volume.min(max_volume))?;
        let demand_price = demand_curve.price_at(volume)?;

        cumulative += (supply_price - demand_price) * step * unit_scale;
        points.push(BudgetGapPoint {
            import_volume: volume,
            budget_gap: cumulative / billion_scale,
        });

        volume += step;
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{
        demand_observation, demand_observations, supply_observation, supply_slice,
    };
    use float_cmp::assert_approx_eq;
    use itertools::Itertools;
    use rstest::rstest;

    #[rstest]
    fn compute_gap_end_to_end(
        supply_slice: Vec<SupplyObservation>,
        demand_observations: Vec<DemandObservation>,
    ) {
        let parameters = GapParameters {
            step: 5.0,
            ..GapParameters::default()
        };
        let points = compute_gap(&supply_slice, &demand_observations, &parameters).unwrap();
        let volumes = points.iter().map(|p| p.import_volume).collect_vec();
        assert_eq!(volumes, [5.0, 10.0, 15.0, 20.0]);

        // Supply prices [50, 50, 80, 80], demand prices [100, 80, 60, 40]
        let mut expected = 0.0;
        for ((supply, demand), point) in [(50.0, 100.0), (50.0, 80.0), (80.0, 60.0), (80.0, 40.0)]
            .into_iter()
            .zip(&points)
        {
            expected += (supply - demand) * 5.0 * 1e6 / 1e9;
            assert_approx_eq!(f64, point.budget_gap, expected, epsilon = 1e-12);
        }

        // The gap first grows more negative, then turns around
        let gaps = points.iter().map(|p| p.budget_gap).collect_vec();
        assert!(gaps[1] < gaps[0]);
        assert!(gaps[3] > gaps[2]);
        assert_approx_eq!(f64, gaps[3], -0.1, epsilon = 1e-12);
    }

    #[rstest]
    fn compute_gap_is_deterministic(
        supply_slice: Vec<SupplyObservation>,
        demand_observations: Vec<DemandObservation>,
    ) {
        let parameters = GapParameters {
            step: 0.1,
            ..GapParameters::default()
        };
        let first = compute_gap(&supply_slice, &demand_observations, &parameters).unwrap();
        let second = compute_gap(&supply_slice, &demand_observations, &parameters).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(1.0, 20)]
    #[case(3.0, 6)]
    #[case(0.1, 200)]
    #[case(0.3, 66)]
    #[case(25.0, 0)]
    fn compute_gap_volumes(
        supply_slice: Vec<SupplyObservation>,
        demand_observations: Vec<DemandObservation>,
        #[case] step: f64,
        #[case] expected_len: usize,
    ) {
        let parameters = GapParameters {
            step,
            ..GapParameters::default()
        };
        let points = compute_gap(&supply_slice, &demand_observations, &parameters).unwrap();
        assert_eq!(points.len(), expected_len);
        if let Some(first) = points.first() {
            assert_eq!(first.import_volume, step);
        }
        for (a, b) in points.iter().tuple_windows() {
            assert!(b.import_volume > a.import_volume);
        }
        for (i, point) in points.iter().enumerate() {
            assert_approx_eq!(f64, point.import_volume, step * (i + 1) as f64, epsilon = 1e-9);
            assert!(point.import_volume <= 20.0 + VOLUME_TOLERANCE);
        }
    }

    #[rstest]
    fn compute_gap_limited_by_demand(supply_slice: Vec<SupplyObservation>) {
        let demand = [
            demand_observation("EU", "S", 2050, 0.0, 200.0),
            demand_observation("EU", "S", 2050, 12.0, 20.0),
        ];
        let parameters = GapParameters {
            step: 4.0,
            ..GapParameters::default()
        };
        let points = compute_gap(&supply_slice, &demand, &parameters).unwrap();
        assert_eq!(
            points.iter().map(|p| p.import_volume).collect_vec(),
            [4.0, 8.0, 12.0]
        );
    }

    #[rstest]
    fn compute_gap_limited_by_supply(demand_observations: Vec<DemandObservation>) {
        let supply = [supply_observation("Kenya", 2050, 7.5, 50.0)];
        let parameters = GapParameters {
            step: 2.5,
            ..GapParameters::default()
        };
        let points = compute_gap(&supply, &demand_observations, &parameters).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points.last().unwrap().import_volume, 7.5);
    }

    #[rstest]
    fn compute_gap_no_supply(demand_observations: Vec<DemandObservation>) {
        let supply: Vec<SupplyObservation> = Vec::new();
        assert_eq!(
            compute_gap(&supply, &demand_observations, &GapParameters::default()).unwrap_err(),
            GapError::Data("supply")
        );
    }

    #[rstest]
    fn compute_gap_no_demand(supply_slice: Vec<SupplyObservation>) {
        let demand: Vec<DemandObservation> = Vec::new();
        assert_eq!(
            compute_gap(&supply_slice, &demand, &GapParameters::default()).unwrap_err(),
            GapError::Data("demand")
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn compute_gap_invalid_step(
        supply_slice: Vec<SupplyObservation>,
        demand_observations: Vec<DemandObservation>,
        #[case] step: f64,
    ) {
        let parameters = GapParameters {
            step,
            ..GapParameters::default()
        };
        assert!(matches!(
            compute_gap(&supply_slice, &demand_observations, &parameters),
            Err(GapError::InvalidParameter { name: "step", .. })
        ));
    }
}
