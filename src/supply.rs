//! Marginal supply curves built from exporters' capacity blocks.
//!
//! Every exporting region offers blocks of import volume at a price. Ranking all blocks for a year
//! by ascending price (the merit order) gives a step function: the price at a given volume is the
//! price of the most expensive block needed to supply that volume.
use crate::error::GapError;
use crate::id::RegionID;
use itertools::Itertools;
use serde::Deserialize;

/// A block of export capacity offered by a region at a given price.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct SupplyObservation {
    /// The exporting region
    #[serde(rename = "region")]
    pub region_id: RegionID,
    /// The year of the observation
    pub year: u32,
    /// Volume of the block.
    ///
    /// This is an increment on top of the region's cheaper blocks, not a cumulative total.
    #[serde(alias = "import_demand")]
    pub import_volume: f64,
    /// The price at which the block is supplied
    pub price: f64,
}

/// Convert supply observations given as cumulative export levels into incremental blocks.
///
/// Observations are grouped by region and year. Within each group, ordered by volume, the first
/// observation keeps its volume and every other one becomes the difference from its predecessor.
/// Each observation keeps its own price and the input order is preserved.
pub fn to_incremental_blocks(observations: &[SupplyObservation]) -> Vec<SupplyObservation> {
    let order = (0..observations.len()).sorted_by(|&a, &b| {
        let (a, b) = (&observations[a], &observations[b]);
        a.region_id
            .cmp(&b.region_id)
            .then(a.year.cmp(&b.year))
            .then(a.import_volume.total_cmp(&b.import_volume))
    });

    let mut blocks = observations.to_vec();
    let mut prev: Option<&SupplyObservation> = None;
    for idx in order {
        let obs = &observations[idx];
        blocks[idx].import_volume = match prev {
            Some(p) if p.region_id == obs.region_id && p.year == obs.year => {
                obs.import_volume - p.import_volume
            }
            _ => obs.import_volume,
        };
        prev = Some(obs);
    }

    blocks
}

/// A range of import volume supplied at a single marginal price
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct MarginalSupplyInterval {
    /// Start of the interval
    pub x_left: f64,
    /// End of the interval
    pub x_right: f64,
    /// Price of the marginal supplier in this interval
    pub price: f64,
}

/// A merit-order supply curve.
///
/// Invariants: there is at least one interval; the intervals are contiguous, starting at zero;
/// prices are non-decreasing.
#[derive(PartialEq, Debug, Clone)]
pub struct MarginalSupplyCurve {
    intervals: Vec<MarginalSupplyInterval>,
}

impl MarginalSupplyCurve {
    /// Build the marginal supply curve for a single year.
    ///
    /// Blocks are sorted by ascending price, keeping input order for blocks with the same price,
    /// and laid end to end from zero.
    ///
    /// # Returns
    ///
    /// The curve, or an error if there are no observations or an observation is invalid.
    pub fn build<'a, I>(observations: I) -> Result<Self, GapError>
    where
        I: IntoIterator<Item = &'a SupplyObservation>,
    {
        let mut blocks = Vec::new();
        for obs in observations {
            let (volume, price) = (obs.import_volume, obs.price);
            if !(volume.is_finite() && volume >= 0.0 && price.is_finite()) {
                return Err(GapError::InvalidObservation {
                    kind: "supply",
                    volume,
                    price,
                });
            }
            blocks.push((volume, price));
        }
        if blocks.is_empty() {
            return Err(GapError::Data("supply"));
        }

        // NB: `sort_by` is stable
        blocks.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut x_right = 0.0;
        let intervals = blocks
            .into_iter()
            .map(|(volume, price)| {
                let x_left = x_right;
                x_right += volume;
                MarginalSupplyInterval {
                    x_left,
                    x_right,
                    price,
                }
            })
            .collect();

        Ok(Self { intervals })
    }

    /// The intervals of the curve, in ascending order of volume
    pub fn intervals(&self) -> &[MarginalSupplyInterval] {
        &self.intervals
    }

    /// The total volume which can be supplied
    pub fn total_volume(&self) -> f64 {
        self.intervals.last().map_or(0.0, |interval| interval.x_right)
    }

    /// Get the price of the marginal supplier at the given import volume.
    ///
    /// This is the price of the first interval whose right edge reaches `volume`. A volume lying
    /// exactly on a boundary between two intervals therefore gets the cheaper price.
    pub fn price_at(&self, volume: f64) -> Result<f64, GapError> {
        if !volume.is_finite() {
            return Err(GapError::InvalidParameter {
                name: "Import volume",
                value: volume,
            });
        }

        let idx = self
            .intervals
            .partition_point(|interval| interval.x_right < volume);
        let interval = self.intervals.get(idx).ok_or(GapError::OutOfRange {
            volume,
            max: self.total_volume(),
        })?;

        Ok(interval.price)
    }
}
