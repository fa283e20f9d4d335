//! Demand curves: the price importers are willing to pay at a given import volume.
//!
//! A demand curve is built from scattered observations of import volume against price for one
//! combination of region, scenario and year. Between observations the price is interpolated
//! linearly; outside the observed range the price at the nearest end is used.
use crate::error::GapError;
use crate::id::{RegionID, ScenarioID};
use serde::Deserialize;

/// A single observation of import demand at a given price.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct DemandObservation {
    /// The importing region
    #[serde(rename = "region")]
    pub region_id: RegionID,
    /// The scenario in which the demand was observed
    #[serde(rename = "scenario")]
    pub scenario_id: ScenarioID,
    /// The year of the observation
    pub year: u32,
    /// Import volume demanded at `price`
    #[serde(alias = "import_H2_demand", alias = "import_demand")]
    pub import_volume: f64,
    /// The import price
    pub price: f64,
}

impl DemandObservation {
    /// Whether this observation belongs to the given region, scenario and year
    pub fn matches(&self, region_id: &RegionID, scenario_id: &ScenarioID, year: u32) -> bool {
        self.year == year && &self.region_id == region_id && &self.scenario_id == scenario_id
    }
}

/// A piecewise-linear demand price curve.
///
/// Invariant: `volumes` is sorted in strictly ascending order, has the same length as `prices` and
/// is never empty.
#[derive(PartialEq, Debug, Clone)]
pub struct DemandCurve {
    volumes: Vec<f64>,
    prices: Vec<f64>,
}

impl DemandCurve {
    /// Build a demand curve from observations for a single region, scenario and year.
    ///
    /// Observations are sorted by import volume, keeping input order for equal volumes. Repeated
    /// observations (same volume and price) are collapsed into one point, but two observations with
    /// the same volume and different prices are rejected, as it is ambiguous which should be used.
    ///
    /// # Returns
    ///
    /// The curve, or an error if there are no observations, an observation is invalid or two
    /// observations conflict.
    pub fn new<'a, I>(observations: I) -> Result<Self, GapError>
    where
        I: IntoIterator<Item = &'a DemandObservation>,
    {
        Self::from_points(
            observations
                .into_iter()
                .map(|obs| (obs.import_volume, obs.price)),
        )
    }

    /// Build a demand curve from `(import_volume, price)` pairs.
    ///
    /// See [`DemandCurve::new`].
    pub fn from_points<I>(points: I) -> Result<Self, GapError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points: Vec<_> = points.into_iter().collect();
        if points.is_empty() {
            return Err(GapError::Data("demand"));
        }

        for &(volume, price) in &points {
            if !(volume.is_finite() && volume >= 0.0 && price.is_finite()) {
                return Err(GapError::InvalidObservation {
                    kind: "demand",
                    volume,
                    price,
                });
            }
        }

        // NB: `sort_by` is stable
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut volumes = Vec::with_capacity(points.len());
        let mut prices: Vec<f64> = Vec::with_capacity(points.len());
        for (volume, price) in points {
            match (volumes.last(), prices.last()) {
                (Some(&prev), Some(&first)) if prev == volume => {
                    if first != price {
                        return Err(GapError::DuplicateVolume {
                            volume,
                            first,
                            second: price,
                        });
                    }
                    continue;
                }
                _ => {}
            }

            volumes.push(volume);
            prices.push(price);
        }

        Ok(Self { volumes, prices })
    }

    /// The largest observed import volume
    pub fn max_volume(&self) -> f64 {
        self.volumes[self.volumes.len() - 1]
    }

    /// The number of distinct points on the curve
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Always false: a curve has at least one point
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Iterate over the `(import_volume, price)` points of the curve in ascending volume order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.volumes.iter().copied().zip(self.prices.iter().copied())
    }

    /// Get the demand price at the given import volume.
    ///
    /// Below the smallest observed volume the first price is returned and above the largest the
    /// last price is returned. Otherwise the price is interpolated linearly between the two
    /// neighbouring observations.
    pub fn price_at(&self, volume: f64) -> Result<f64, GapError> {
        if !volume.is_finite() {
            return Err(GapError::InvalidParameter {
                name: "Import volume",
                value: volume,
            });
        }

        let last = self.volumes.len() - 1;
        if volume <= self.volumes[0] {
            return Ok(self.prices[0]);
        }
        if volume >= self.volumes[last] {
            return Ok(self.prices[last]);
        }

        // Smallest index with volumes[i] >= volume. Must be in 1..=last given the checks above.
        let i = self.volumes.partition_point(|&q| q < volume);
        let (q1, q2) = (self.volumes[i - 1], self.volumes[i]);
        let (p1, p2) = (self.prices[i - 1], self.prices[i]);
        if q2 == q1 {
            return Err(GapError::Division { volume: q1 });
        }

        Ok(p1 + (p2 - p1) * (volume - q1) / (q2 - q1))
    }
}

/// Get the demand price at `volume` for a slice of demand observations.
///
/// This is a convenience wrapper around [`DemandCurve::new`] and [`DemandCurve::price_at`]. When
/// querying the same observations repeatedly, build the curve once instead.
pub fn interpolate_demand_price<'a, I>(observations: I, volume: f64) -> Result<f64, GapError>
where
    I: IntoIterator<Item = &'a DemandObservation>,
{
    DemandCurve::new(observations)?.price_at(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{demand_observations, demand_slice};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(5.0, 5.0)] // below range
    #[case(10.0, 5.0)] // first point
    #[case(15.0, 6.5)]
    #[case(20.0, 8.0)] // interior point
    #[case(25.0, 10.0)]
    #[case(30.0, 12.0)] // last point
    #[case(100.0, 12.0)] // above range
    fn demand_price_at(
        demand_slice: Vec<DemandObservation>,
        #[case] volume: f64,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(
            f64,
            interpolate_demand_price(&demand_slice, volume).unwrap(),
            expected
        );
    }

    #[rstest]
    fn demand_curve_sorts_observations(mut demand_slice: Vec<DemandObservation>) {
        demand_slice.reverse();
        let curve = DemandCurve::new(&demand_slice).unwrap();
        assert_eq!(
            curve.iter().collect::<Vec<_>>(),
            [(10.0, 5.0), (20.0, 8.0), (30.0, 12.0)]
        );
        assert_eq!(curve.max_volume(), 30.0);
    }

    #[test]
    fn demand_curve_single_point() {
        let curve = DemandCurve::from_points([(10.0, 42.0)]).unwrap();
        assert_eq!(curve.price_at(0.0).unwrap(), 42.0);
        assert_eq!(curve.price_at(10.0).unwrap(), 42.0);
        assert_eq!(curve.price_at(50.0).unwrap(), 42.0);
    }

    #[test]
    fn demand_curve_empty() {
        assert_eq!(
            DemandCurve::from_points([]).unwrap_err(),
            GapError::Data("demand")
        );
        let observations: Vec<DemandObservation> = Vec::new();
        assert!(interpolate_demand_price(&observations, 1.0).is_err());
    }

    #[test]
    fn demand_curve_repeated_point_collapsed() {
        let curve = DemandCurve::from_points([(0.0, 200.0), (10.0, 50.0), (0.0, 200.0)]).unwrap();
        assert_eq!(curve.len(), 2);
        assert_approx_eq!(f64, curve.price_at(5.0).unwrap(), 125.0);
    }

    #[test]
    fn demand_curve_conflicting_duplicate() {
        assert_eq!(
            DemandCurve::from_points([(0.0, 200.0), (10.0, 50.0), (0.0, 190.0)]).unwrap_err(),
            GapError::DuplicateVolume {
                volume: 0.0,
                first: 200.0,
                second: 190.0
            }
        );
    }

    #[rstest]
    #[case(-1.0, 10.0)]
    #[case(f64::NAN, 10.0)]
    #[case(1.0, f64::INFINITY)]
    fn demand_curve_invalid_observation(#[case] volume: f64, #[case] price: f64) {
        assert!(matches!(
            DemandCurve::from_points([(volume, price)]),
            Err(GapError::InvalidObservation { .. })
        ));
    }

    #[rstest]
    fn demand_price_at_nan(demand_slice: Vec<DemandObservation>) {
        let curve = DemandCurve::new(&demand_slice).unwrap();
        assert!(curve.price_at(f64::NAN).is_err());
    }

    #[rstest]
    fn demand_observation_matches(demand_observations: Vec<DemandObservation>) {
        let obs = &demand_observations[0];
        assert!(obs.matches(&"EU".into(), &"S".into(), 2050));
        assert!(!obs.matches(&"DE".into(), &"S".into(), 2050));
        assert!(!obs.matches(&"EU".into(), &"S".into(), 2030));
    }
}
