//! Component structs for enemies and turrets.
//!
//! Behaviour lives next to the systems that drive it: path traversal and
//! damage in [`crate::enemy`], acquisition and tracking in [`crate::turret`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{EnemyKind, EnemyProfile, Rotation, TurretKind, TurretProfile};
use crate::entity::{EntityId, Layer};
use crate::population::RemovalCause;

/// Side effect a turret applies alongside damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum HitEffect {
    /// Damage only.
    #[default]
    None,
    /// Multiplies the target's speed by `factor` (in `(0, 1]`).
    Slow {
        /// Speed multiplier.
        factor: f32,
    },
}

/// Enemy lifecycle. `Despawned` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Walking the path.
    #[default]
    Alive,
    /// Gone, for the recorded reason. Never left once entered.
    Despawned(RemovalCause),
}

impl Lifecycle {
    /// Returns `true` while the enemy is still walking.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Components for enemy entities.
///
/// `path_index` is the waypoint currently walked towards. It ranges over
/// `0..=path.len()`, where `path.len()` is the terminal "reached end" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyComponents {
    /// Which variant spawned this enemy.
    pub kind: EnemyKind,
    /// Remaining health, clamped at zero once damaged.
    pub health: i32,
    /// Base movement speed in length units per second.
    pub speed: f32,
    /// Speed multiplier from slow effects; 1.0 when unaffected.
    pub slow_factor: f32,
    /// Waypoint currently walked towards.
    pub path_index: usize,
    /// World position.
    pub position: Vec2,
    /// Alive or despawned.
    pub lifecycle: Lifecycle,
}

impl EnemyComponents {
    /// Creates an enemy from `profile` standing at `position`, heading for
    /// waypoint 0.
    #[must_use]
    pub fn new(profile: EnemyProfile, position: Vec2) -> Self {
        Self {
            kind: profile.kind,
            health: profile.health,
            speed: profile.move_speed,
            slow_factor: 1.0,
            path_index: 0,
            position,
            lifecycle: Lifecycle::Alive,
        }
    }

    /// Speed after slow effects.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.slow_factor
    }

    /// Returns `true` while the enemy is still walking.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }
}

/// Components for turret entities.
///
/// `facing` is in radians, measured counter-clockwise from +X, in
/// `(-PI, PI]`. `target` is a non-owning lookup key: it is resolved against
/// the arena every tick and cleared as soon as it resolves to nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretComponents {
    /// Which variant this turret is.
    pub kind: TurretKind,
    /// World position.
    pub position: Vec2,
    /// Acquisition radius.
    pub range: f32,
    /// Current facing in radians.
    pub facing: f32,
    /// Turn policy.
    pub rotation: Rotation,
    /// Effect applied with each hit.
    pub hit_effect: HitEffect,
    /// Locked target, if any.
    pub target: Option<EntityId>,
    /// Layers searched for candidates.
    pub mask: Layer,
}

impl TurretComponents {
    /// Creates an idle turret from `profile` at `position`, facing +X.
    #[must_use]
    pub fn new(profile: TurretProfile, position: Vec2) -> Self {
        Self {
            kind: profile.kind,
            position,
            range: profile.targeting_range,
            facing: 0.0,
            rotation: profile.rotation,
            hit_effect: profile.hit_effect,
            target: None,
            mask: Layer::ENEMY,
        }
    }

    /// Returns `true` if a target is locked.
    #[must_use]
    pub const fn has_target(&self) -> bool {
        self.target.is_some()
    }
}
