//! Error types for session construction.
//!
//! Configuration problems are reported once, when a [`Session`](crate::session::Session)
//! or one of its parts is built. Ticking never fails: invariant violations
//! found mid-simulation are clamped and logged instead (see
//! [`PopulationCounter`](crate::population::PopulationCounter)).

use thiserror::Error;

use crate::config::EnemyKind;

/// Convenience alias for results produced by this crate.
pub type BulwarkResult<T> = Result<T, ConfigError>;

/// Errors raised while building or installing a waypoint path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path has no waypoints.
    #[error("path must contain at least one waypoint")]
    Empty,

    /// A waypoint coordinate is NaN or infinite.
    #[error("waypoint {index} has a non-finite coordinate")]
    NonFiniteWaypoint {
        /// Index of the offending waypoint.
        index: usize,
    },

    /// A path slot was initialized a second time.
    #[error("path slot is already initialized")]
    AlreadyInitialized,

    /// A path slot was read before any path was stored in it.
    #[error("path slot has not been initialized")]
    Uninitialized,
}

/// Errors raised by configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `enemies_per_second` is zero, negative or NaN.
    #[error("enemies_per_second must be positive, got {0}")]
    NonPositiveSpawnRate(f32),

    /// `base_enemies` is zero.
    #[error("base_enemies must be positive, got {0}")]
    NonPositiveBaseEnemies(u32),

    /// `difficulty_scaling_factor` lies outside `(0, 2]`.
    #[error("difficulty_scaling_factor must lie in (0, 2], got {0}")]
    ScalingFactorOutOfRange(f64),

    /// `time_between_waves` is negative or NaN.
    #[error("time_between_waves must be non-negative, got {0}")]
    NegativeWaveDelay(f32),

    /// The arrival epsilon is not a positive finite number.
    #[error("arrival_epsilon must be positive and finite, got {0}")]
    InvalidArrivalEpsilon(f32),

    /// No enemy profiles were configured.
    #[error("enemy roster is empty")]
    EmptyRoster,

    /// An enemy profile has unusable stats.
    #[error("invalid {kind} profile: {reason}")]
    InvalidEnemyProfile {
        /// Kind of the rejected profile.
        kind: EnemyKind,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A turret profile has unusable stats.
    #[error("invalid turret profile: {reason}")]
    InvalidTurretProfile {
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The supplied path was rejected.
    #[error(transparent)]
    Path(#[from] PathError),
}
