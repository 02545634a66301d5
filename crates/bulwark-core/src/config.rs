//! In-process configuration for a simulation session.
//!
//! Everything here is plain data supplied at construction. Validation runs
//! once, up front, so that a bad spawn rate or an empty roster fails before
//! the first tick rather than during it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::HitEffect;
use crate::error::{BulwarkResult, ConfigError};

/// Default distance below which an enemy counts as having reached a waypoint.
pub const DEFAULT_ARRIVAL_EPSILON: f32 = 0.1;

// Guards `Ceiling` against `powf` landing a hair above an exact integer.
const CEILING_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Wave Configuration
// =============================================================================

/// Rounding policy applied to the raw wave quota `base * wave^factor`.
///
/// The default, [`Ceiling`](Self::Ceiling), is the only policy that yields
/// the documented progression of 8, 14 and 19 enemies for base 8 and factor
/// 0.75; rounding to nearest gives 8, 13 and 18. The policy is fixed for a
/// session so that quotas are reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotaRounding {
    /// Round up to the next integer: 8, 14, 19 for base 8 and factor 0.75.
    #[default]
    Ceiling,
    /// Round to nearest, ties to even: 8, 13, 18 for base 8 and factor 0.75.
    HalfEven,
    /// Round to nearest, ties away from zero.
    HalfAwayFromZero,
}

impl QuotaRounding {
    /// Applies the policy to a non-negative raw quota.
    #[must_use]
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            Self::Ceiling => (raw - CEILING_TOLERANCE).ceil().max(0.0),
            Self::HalfEven => raw.round_ties_even(),
            Self::HalfAwayFromZero => raw.round(),
        }
    }
}

/// Wave scheduling parameters.
///
/// # Example
///
/// ```
/// use bulwark_core::config::WaveConfig;
///
/// let config = WaveConfig::default();
/// assert_eq!(config.quota(1), 8);
/// assert_eq!(config.quota(2), 14);
/// assert_eq!(config.quota(3), 19);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Enemies in the first wave.
    pub base_enemies: u32,
    /// Spawn rate while a wave is being emitted.
    pub enemies_per_second: f32,
    /// Delay in seconds between a cleared wave and the next one.
    pub time_between_waves: f32,
    /// Exponent applied to the wave number when computing quotas.
    pub difficulty_scaling_factor: f64,
    /// How the raw quota is turned into an integer.
    pub rounding: QuotaRounding,
}

impl WaveConfig {
    /// Checks every field, failing on the first unusable value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the rejected field.
    pub fn validate(&self) -> BulwarkResult<()> {
        if self.base_enemies == 0 {
            return Err(ConfigError::NonPositiveBaseEnemies(self.base_enemies));
        }
        if !(self.enemies_per_second > 0.0) || !self.enemies_per_second.is_finite() {
            return Err(ConfigError::NonPositiveSpawnRate(self.enemies_per_second));
        }
        if !(self.time_between_waves >= 0.0) || !self.time_between_waves.is_finite() {
            return Err(ConfigError::NegativeWaveDelay(self.time_between_waves));
        }
        let factor = self.difficulty_scaling_factor;
        if !(factor > 0.0 && factor <= 2.0) {
            return Err(ConfigError::ScalingFactorOutOfRange(factor));
        }
        Ok(())
    }

    /// Number of enemies emitted during `wave` (1-based).
    ///
    /// Wave 0 is treated as wave 1.
    #[must_use]
    pub fn quota(&self, wave: u32) -> u32 {
        let wave = f64::from(wave.max(1));
        let raw = f64::from(self.base_enemies) * wave.powf(self.difficulty_scaling_factor);
        let rounded = self.rounding.apply(raw);
        // Saturate rather than wrap for absurd wave numbers.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let quota = rounded.min(f64::from(u32::MAX)) as u32;
        quota
    }

    /// Seconds between two spawns inside a wave.
    #[must_use]
    pub fn spawn_interval(&self) -> f32 {
        1.0 / self.enemies_per_second
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_enemies: 8,
            enemies_per_second: 0.5,
            time_between_waves: 5.0,
            difficulty_scaling_factor: 0.75,
            rounding: QuotaRounding::default(),
        }
    }
}

// =============================================================================
// Enemy Profiles
// =============================================================================

/// Enemy variant. Variants differ only in their [`EnemyProfile`] numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Basic,
    /// Quicker than Basic, same health.
    Fast,
    /// Slow with double health.
    Tank,
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "Basic"),
            Self::Fast => write!(f, "Fast"),
            Self::Tank => write!(f, "Tank"),
        }
    }
}

/// Starting stats for one enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Which variant this profile describes.
    pub kind: EnemyKind,
    /// Starting health.
    pub health: i32,
    /// Movement speed in length units per second.
    pub move_speed: f32,
}

impl EnemyProfile {
    /// Baseline enemy: 100 health, speed 2.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            kind: EnemyKind::Basic,
            health: 100,
            move_speed: 2.0,
        }
    }

    /// Fast enemy: 100 health, speed 3.5.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            kind: EnemyKind::Fast,
            health: 100,
            move_speed: 3.5,
        }
    }

    /// Tank enemy: 200 health, speed 1.5.
    #[must_use]
    pub const fn tank() -> Self {
        Self {
            kind: EnemyKind::Tank,
            health: 200,
            move_speed: 1.5,
        }
    }

    /// Preset profile for `kind`.
    #[must_use]
    pub const fn preset(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Basic => Self::basic(),
            EnemyKind::Fast => Self::fast(),
            EnemyKind::Tank => Self::tank(),
        }
    }

    /// Rejects non-positive health or speed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnemyProfile`].
    pub fn validate(&self) -> BulwarkResult<()> {
        if self.health <= 0 {
            return Err(ConfigError::InvalidEnemyProfile {
                kind: self.kind,
                reason: "health must be positive",
            });
        }
        if !(self.move_speed > 0.0) || !self.move_speed.is_finite() {
            return Err(ConfigError::InvalidEnemyProfile {
                kind: self.kind,
                reason: "move_speed must be positive and finite",
            });
        }
        Ok(())
    }
}

// =============================================================================
// Turret Profiles
// =============================================================================

/// Turret variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurretKind {
    /// Plain damage.
    Fire,
    /// Damage plus slow-on-hit.
    Ice,
}

/// How fast a turret turns onto its bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rotation {
    /// Snaps onto the bearing every tick.
    Instant,
    /// Turns at most this many radians per second along the shortest arc.
    Rate(f32),
}

impl Rotation {
    /// Largest turn allowed over `dt` seconds, or `None` when snapping.
    #[must_use]
    pub fn max_step(self, dt: f32) -> Option<f32> {
        match self {
            Self::Instant => None,
            Self::Rate(rate) => Some(rate * dt.max(0.0)),
        }
    }
}

/// Stats for one turret kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretProfile {
    /// Which variant this profile describes.
    pub kind: TurretKind,
    /// Acquisition radius.
    pub targeting_range: f32,
    /// Turn policy.
    pub rotation: Rotation,
    /// Effect applied alongside damage when this turret hits.
    pub hit_effect: HitEffect,
}

impl TurretProfile {
    /// Fire turret: range 5, instant rotation, no side effect.
    #[must_use]
    pub const fn fire() -> Self {
        Self {
            kind: TurretKind::Fire,
            targeting_range: 5.0,
            rotation: Rotation::Instant,
            hit_effect: HitEffect::None,
        }
    }

    /// Ice turret: range 4, instant rotation, halves target speed on hit.
    #[must_use]
    pub const fn ice() -> Self {
        Self {
            kind: TurretKind::Ice,
            targeting_range: 4.0,
            rotation: Rotation::Instant,
            hit_effect: HitEffect::Slow { factor: 0.5 },
        }
    }

    /// Returns a copy turning at `rate` radians per second.
    #[must_use]
    pub fn with_rotation_speed(mut self, rate: f32) -> Self {
        self.rotation = Rotation::Rate(rate);
        self
    }

    /// Returns a copy with a different range.
    #[must_use]
    pub fn with_range(mut self, targeting_range: f32) -> Self {
        self.targeting_range = targeting_range;
        self
    }

    /// Rejects a non-positive range or turn rate and out-of-range slow factors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTurretProfile`].
    pub fn validate(&self) -> BulwarkResult<()> {
        if !(self.targeting_range > 0.0) || !self.targeting_range.is_finite() {
            return Err(ConfigError::InvalidTurretProfile {
                reason: "targeting_range must be positive and finite",
            });
        }
        if let Rotation::Rate(rate) = self.rotation {
            if !(rate > 0.0) || !rate.is_finite() {
                return Err(ConfigError::InvalidTurretProfile {
                    reason: "rotation rate must be positive and finite",
                });
            }
        }
        if let HitEffect::Slow { factor } = self.hit_effect {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(ConfigError::InvalidTurretProfile {
                    reason: "slow factor must lie in (0, 1]",
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Everything a [`Session`](crate::session::Session) needs besides its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wave scheduling parameters.
    pub wave: WaveConfig,
    /// Enemy kinds the director draws from, uniformly.
    pub roster: Vec<EnemyProfile>,
    /// Seed for enemy kind selection.
    pub seed: u64,
    /// Distance at which a waypoint counts as reached.
    pub arrival_epsilon: f32,
}

impl SessionConfig {
    /// Validates the wave parameters, the roster and the epsilon.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> BulwarkResult<()> {
        self.wave.validate()?;
        if self.roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        for profile in &self.roster {
            profile.validate()?;
        }
        if !(self.arrival_epsilon > 0.0) || !self.arrival_epsilon.is_finite() {
            return Err(ConfigError::InvalidArrivalEpsilon(self.arrival_epsilon));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wave: WaveConfig::default(),
            roster: vec![EnemyProfile::fast(), EnemyProfile::tank()],
            seed: 0,
            arrival_epsilon: DEFAULT_ARRIVAL_EPSILON,
        }
    }
}
