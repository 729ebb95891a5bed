//! Brain wiring and configuration errors.

use thiserror::Error;

use crate::activity::Activity;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrainError {
    #[error("behavior `{behavior}` uses memory `{memory}` which is not in the brain's schema")]
    UnregisteredMemory {
        behavior: &'static str,
        memory: &'static str,
    },

    #[error("activity {0:?} was added without behaviors")]
    EmptyActivity(Activity),

    #[error("brain has no core activity")]
    MissingCoreActivity,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid range for `{field}`: min {min} > max {max}")]
    InvalidRange {
        field: &'static str,
        min: u64,
        max: u64,
    },

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}
