//! Turret target acquisition and tracking.
//!
//! Each tick a turret:
//!
//! 1. Resolves its locked target through [`SpatialQuery::position_of`]. A
//!    target that no longer resolves (reached the end, was defeated) is
//!    dropped.
//! 2. If it has no target, asks for everything on its mask within range and
//!    locks onto the first candidate. Queries return IDs in ascending order,
//!    so "first" is the oldest enemy in range.
//! 3. Turns towards the target's current position.
//!
//! Range is only checked at acquisition. A locked target keeps being tracked
//! after it walks out of range, until it leaves the simulation.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::SpatialQuery;
use crate::entity::{EntityId, TurretComponents};

/// What happened to a turret's lock during one update.
///
/// Both fields can be set at once: the old target vanished and a new one was
/// acquired in the same tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackOutcome {
    /// Target that stopped resolving and was released.
    pub lost: Option<EntityId>,
    /// Target newly locked this update.
    pub acquired: Option<EntityId>,
}

impl TrackOutcome {
    /// Returns `true` if the lock did not change.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.lost.is_none() && self.acquired.is_none()
    }
}

/// Wraps an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

impl TurretComponents {
    /// Runs one targeting step against `world`.
    pub fn update(&mut self, dt: f32, world: &impl SpatialQuery) -> TrackOutcome {
        let mut outcome = TrackOutcome::default();

        if let Some(target) = self.target {
            if world.position_of(target).is_none() {
                self.target = None;
                outcome.lost = Some(target);
            }
        }

        if self.target.is_none() {
            if let Some(found) = self.find_target(world) {
                self.target = Some(found);
                outcome.acquired = Some(found);
            }
        }

        if let Some(point) = self.target.and_then(|id| world.position_of(id)) {
            self.rotate_towards(point, dt);
        }

        outcome
    }

    /// First candidate within range on this turret's mask.
    #[must_use]
    pub fn find_target(&self, world: &impl SpatialQuery) -> Option<EntityId> {
        world
            .query_in_range(self.position, self.range, self.mask)
            .into_iter()
            .next()
    }

    /// Angle from this turret to `point`, or `None` if they coincide.
    #[must_use]
    pub fn bearing_to(&self, point: Vec2) -> Option<f32> {
        let offset = point - self.position;
        if offset.length_squared() <= f32::EPSILON * f32::EPSILON {
            return None;
        }
        Some(offset.y.atan2(offset.x))
    }

    /// Turns towards `point` along the shortest arc.
    ///
    /// [`Rotation::Instant`](crate::config::Rotation::Instant) snaps to the
    /// bearing. A rate turns by at most `rate * dt` radians.
    pub fn rotate_towards(&mut self, point: Vec2, dt: f32) {
        let Some(bearing) = self.bearing_to(point) else {
            return;
        };
        let Some(max_step) = self.rotation.max_step(dt) else {
            self.facing = bearing;
            return;
        };

        let delta = wrap_angle(bearing - self.facing);
        if delta.abs() <= max_step {
            self.facing = bearing;
        } else {
            self.facing = wrap_angle(self.facing + max_step.copysign(delta));
        }
    }
}
