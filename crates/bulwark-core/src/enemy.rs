//! Enemy path traversal and damage.
//!
//! An enemy walks towards waypoint `path_index` at its effective speed. A
//! single tick never carries it past the waypoint it is heading for: the
//! step is clamped to the remaining distance, and any movement budget left
//! over after an arrival is spent on the next segment. Arrival is declared
//! once the enemy is within the arrival epsilon of the waypoint.
//!
//! Both ways out of the simulation, reaching the end of the path and being
//! defeated, go through [`EnemyComponents::despawn`], which flips the
//! lifecycle to `Despawned` and reports to the director exactly once. An
//! enemy killed in the same tick it reaches the end is reported under
//! whichever cause happened first.

use glam::Vec2;

use crate::entity::{EnemyComponents, EntityId, HitEffect, Lifecycle};
use crate::path::PathCatalog;
use crate::population::{Removal, RemovalCause, RemovalNotifier};

impl EnemyComponents {
    /// Creates a fresh enemy at the start of `path`.
    #[must_use]
    pub fn spawn(profile: crate::config::EnemyProfile, path: &PathCatalog) -> Self {
        Self::new(profile, path.start())
    }

    /// Moves the enemy along `path` for `dt` seconds.
    ///
    /// Returns the removal cause if this call despawned the enemy. Calling
    /// it on a despawned enemy does nothing.
    pub fn advance(
        &mut self,
        id: EntityId,
        dt: f32,
        path: &PathCatalog,
        epsilon: f32,
        notifier: &RemovalNotifier,
    ) -> Option<RemovalCause> {
        if !self.is_alive() {
            return None;
        }

        let mut budget = self.effective_speed() * dt.max(0.0);
        loop {
            let Some(waypoint) = path.waypoint(self.path_index) else {
                tracing::error!(
                    %id,
                    path_index = self.path_index,
                    path_len = path.len(),
                    "enemy path index past the end of the path"
                );
                debug_assert!(false, "enemy {id} path index past the end of the path");
                self.path_index = path.len();
                return self.despawn(id, RemovalCause::ReachedEnd, notifier);
            };

            budget -= self.step_towards(waypoint, budget);
            if self.position.distance(waypoint) > epsilon {
                return None;
            }

            self.path_index += 1;
            if self.path_index == path.len() {
                return self.despawn(id, RemovalCause::ReachedEnd, notifier);
            }
            if budget <= 0.0 {
                return None;
            }
        }
    }

    /// Subtracts `amount` from health, clamping at zero.
    ///
    /// Negative amounts are ignored. Returns `Some(Defeated)` if this call
    /// killed the enemy.
    pub fn take_damage(
        &mut self,
        id: EntityId,
        amount: i32,
        notifier: &RemovalNotifier,
    ) -> Option<RemovalCause> {
        if !self.is_alive() {
            return None;
        }
        self.health = self.health.saturating_sub(amount.max(0)).max(0);
        if self.health == 0 {
            return self.despawn(id, RemovalCause::Defeated, notifier);
        }
        None
    }

    /// Applies damage, then the hit effect if the enemy survived.
    ///
    /// Slows do not stack: the strongest one applied so far wins.
    pub fn apply_hit(
        &mut self,
        id: EntityId,
        amount: i32,
        effect: HitEffect,
        notifier: &RemovalNotifier,
    ) -> Option<RemovalCause> {
        let removed = self.take_damage(id, amount, notifier);
        if removed.is_none() && self.is_alive() {
            if let HitEffect::Slow { factor } = effect {
                self.slow_factor = self.slow_factor.min(factor.clamp(0.0, 1.0));
            }
        }
        removed
    }

    /// Moves into the terminal state and notifies the director.
    ///
    /// Only the first call has any effect; it returns `Some(cause)`. Every
    /// later call returns `None` without notifying.
    pub fn despawn(
        &mut self,
        id: EntityId,
        cause: RemovalCause,
        notifier: &RemovalNotifier,
    ) -> Option<RemovalCause> {
        if !self.is_alive() {
            return None;
        }
        self.lifecycle = Lifecycle::Despawned(cause);
        notifier.notify(Removal::new(id, cause));
        tracing::debug!(%id, kind = %self.kind, %cause, "enemy despawned");
        Some(cause)
    }

    // Moves at most `budget` towards `waypoint`, never past it. Returns the
    // distance actually travelled.
    fn step_towards(&mut self, waypoint: Vec2, budget: f32) -> f32 {
        let offset = waypoint - self.position;
        let distance = offset.length();
        if distance <= 0.0 || budget <= 0.0 {
            return 0.0;
        }
        if budget >= distance {
            self.position = waypoint;
            return distance;
        }
        self.position += offset * (budget / distance);
        budget
    }
}
