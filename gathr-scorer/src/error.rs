//! Error types raised while configuring the scoring engine.
#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors returned by [`ScoreWeights::validate`](crate::ScoreWeights::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreWeightsError {
    /// A weight or threshold is `NaN` or infinite.
    #[error("weight `{field}` must be finite")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A weight or threshold is negative.
    #[error("weight `{field}` must not be negative")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A value used as a divisor is zero.
    #[error("weight `{field}` must be greater than zero")]
    ZeroDivisor {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Distance tiers are not in ascending order.
    #[error("distance tiers must satisfy near_km <= quick_km <= far_km")]
    DistanceTiers,
}
