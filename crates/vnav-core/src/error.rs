//! Error types for explicit engine commands.
//!
//! Constraint infeasibility is not an error: over-restrictive legs are marked
//! invalid and an unsolvable chain forces a rebuild. These variants only cover
//! misuse of the command API.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VnavError {
    #[error("invalid VNAV configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("no lateral flight plan at index {0}")]
    UnknownPlan(usize),

    #[error("leg {leg_index} is outside lateral flight plan {plan_index}")]
    LegOutOfRange { plan_index: usize, leg_index: usize },
}

pub type Result<T> = std::result::Result<T, VnavError>;
