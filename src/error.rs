//! Error types for the curve-building and gap-integration core.
//!
//! Everything outside the core (input, batch, output and the CLI) uses [`anyhow`], wrapping these
//! errors with context about which combination of region, scenario, year and carrier failed.
use thiserror::Error;

/// Failures of the curve and gap calculations.
///
/// All of these stem from bad or inconsistent input data, so none of them are retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GapError {
    /// An input slice was empty after filtering
    #[error("No {0} data found")]
    Data(&'static str),

    /// Interpolation between two points with the same import volume
    #[error("Cannot interpolate between two points with the same import volume ({volume})")]
    Division {
        /// The import volume shared by both points
        volume: f64,
    },

    /// A volume was queried beyond the end of the marginal supply curve
    #[error("Import volume {volume} exceeds total supply volume {max}")]
    OutOfRange {
        /// The queried volume
        volume: f64,
        /// Total volume covered by the supply curve
        max: f64,
    },

    /// Two demand observations share an import volume but disagree on price
    #[error("Demand observations at import volume {volume} have conflicting prices {first} and {second}")]
    DuplicateVolume {
        /// The shared import volume
        volume: f64,
        /// Price of the first observation (in input order)
        first: f64,
        /// Price of the conflicting observation
        second: f64,
    },

    /// An observation had a negative or non-finite volume or a non-finite price
    #[error("Invalid {kind} observation: volume {volume}, price {price}")]
    InvalidObservation {
        /// Either "demand" or "supply"
        kind: &'static str,
        /// Import volume
        volume: f64,
        /// Price
        price: f64,
    },

    /// The sweep step or a scaling factor was not a positive finite number
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// The value supplied
        value: f64,
    },
}
