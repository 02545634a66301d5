//! Session: the composition root that owns a level's simulation.
//!
//! A [`Session`] owns the [`Arena`], the [`PathCatalog`] and the
//! [`WaveDirector`], and advances them in a fixed order each tick:
//!
//! 1. **DIRECTOR**: drain removals, advance the wave timer, maybe spawn.
//! 2. **ENEMIES**: every enemy walks its path. Each step is computed in
//!    parallel on a copy of the enemy; the results are sorted by ID and
//!    written back one at a time, despawning enemies that left.
//! 3. **TURRETS**: every turret resolves or acquires its target and turns.
//!    Computed in parallel against a read-only arena, then applied in ID
//!    order.
//!
//! # Determinism
//!
//! Parallel phases only read shared state. Their outputs are sorted by
//! entity ID before anything is written, and the only RNG lives in the
//! director, so two sessions built from the same config and path produce
//! the same snapshots tick for tick.
//!
//! # Example
//!
//! ```
//! use bulwark_core::config::{SessionConfig, TurretProfile};
//! use bulwark_core::path::PathCatalog;
//! use bulwark_core::session::Session;
//! use glam::Vec2;
//!
//! let path = PathCatalog::new(vec![Vec2::ZERO, Vec2::new(20.0, 0.0)]).unwrap();
//! let mut session = Session::new(SessionConfig::default(), path).unwrap();
//! session.place_turret(TurretProfile::fire(), Vec2::new(5.0, 2.0)).unwrap();
//!
//! for _ in 0..100 {
//!     session.tick(0.05);
//! }
//! assert_eq!(session.tick_count(), 100);
//! assert_eq!(session.director().current_wave(), 1);
//! ```

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::config::{SessionConfig, TurretProfile};
use crate::entity::{EnemyComponents, EntityId, EntityInner, HitEffect, TurretComponents};
use crate::error::{BulwarkResult, PathError};
use crate::path::{PathCatalog, PathSlot};
use crate::population::{Removal, RemovalCause};
use crate::turret::TrackOutcome;
use crate::wave::{WaveDirector, WaveEvent, WaveSnapshot};

// =============================================================================
// Reports and Snapshots
// =============================================================================

/// A change in one turret's lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetChange {
    /// Turret whose lock changed.
    pub turret: EntityId,
    /// What changed.
    pub outcome: TrackOutcome,
}

/// Everything observable that happened during one [`Session::tick`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number this report covers.
    pub tick: u64,
    /// Director transitions, in order.
    pub wave_events: Vec<WaveEvent>,
    /// Enemies that left during the enemy phase, by ID.
    pub removals: Vec<Removal>,
    /// Turret lock changes, by turret ID.
    pub target_changes: Vec<TargetChange>,
}

/// Serializable view of a whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Ticks executed so far.
    pub tick: u64,
    /// Simulated seconds so far.
    pub elapsed: f64,
    /// Director state.
    pub wave: WaveSnapshot,
    /// Live enemies in ID order.
    pub enemies: Vec<(EntityId, EnemyComponents)>,
    /// Turrets in ID order.
    pub turrets: Vec<(EntityId, TurretComponents)>,
}

// =============================================================================
// Session
// =============================================================================

/// One level's simulation.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    path: PathCatalog,
    arena: Arena,
    director: WaveDirector,
    elapsed: f64,
    ended: bool,
}

impl Session {
    /// Builds a session on `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::error::ConfigError) if `config` does
    /// not validate. Nothing is ticked before validation succeeds.
    pub fn new(config: SessionConfig, path: PathCatalog) -> BulwarkResult<Self> {
        config.validate()?;
        let director =
            WaveDirector::new(config.wave.clone(), config.roster.clone(), config.seed)?;
        tracing::info!(
            waypoints = path.len(),
            path_length = path.total_length(),
            seed = config.seed,
            "session created"
        );
        Ok(Self {
            config,
            path,
            arena: Arena::new(),
            director,
            elapsed: 0.0,
            ended: false,
        })
    }

    /// Builds a session on the path stored in `slot`.
    ///
    /// The session keeps its own handle to the catalog; later changes to the
    /// slot's owner do not affect it.
    ///
    /// # Errors
    ///
    /// [`PathError::Uninitialized`](crate::error::PathError::Uninitialized)
    /// if no path has been stored yet, otherwise as [`Session::new`].
    pub fn from_slot(config: SessionConfig, slot: &PathSlot) -> BulwarkResult<Self> {
        let path = slot.get().cloned().ok_or(PathError::Uninitialized)?;
        Self::new(config, path)
    }

    /// Places a turret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTurretProfile`](crate::error::ConfigError::InvalidTurretProfile)
    /// if the profile does not validate.
    pub fn place_turret(
        &mut self,
        profile: TurretProfile,
        position: Vec2,
    ) -> BulwarkResult<EntityId> {
        profile.validate()?;
        let id = self
            .arena
            .spawn(EntityInner::Turret(TurretComponents::new(profile, position)));
        tracing::debug!(
            %id,
            kind = ?profile.kind,
            x = position.x,
            y = position.y,
            "turret placed"
        );
        Ok(id)
    }

    /// Advances the whole simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = dt.max(0.0);
        let tick = self.arena.current_tick();

        // PHASE 1: DIRECTOR
        let wave_events = self.director.tick(dt, &mut self.arena, &self.path);

        // PHASE 2: ENEMIES
        let removals = self.step_enemies(dt);

        // PHASE 3: TURRETS
        let target_changes = self.step_turrets(dt);

        self.arena.advance_tick();
        self.elapsed += f64::from(dt);

        TickReport {
            tick,
            wave_events,
            removals,
            target_changes,
        }
    }

    fn step_enemies(&mut self, dt: f32) -> Vec<Removal> {
        let path = &self.path;
        let epsilon = self.config.arrival_epsilon;
        let notifier = self.director.notifier();

        let enemies: Vec<(EntityId, &EnemyComponents)> = self.arena.enemies().collect();
        let mut stepped: Vec<(EntityId, EnemyComponents, Option<RemovalCause>)> = enemies
            .par_iter()
            .map(|(id, enemy)| {
                let mut next = (*enemy).clone();
                let cause = next.advance(*id, dt, path, epsilon, notifier);
                (*id, next, cause)
            })
            .collect();
        stepped.sort_by_key(|(id, ..)| *id);

        let mut removals = Vec::new();
        for (id, next, cause) in stepped {
            if let Some(cause) = cause {
                self.arena.despawn(id);
                removals.push(Removal::new(id, cause));
            } else if let Some(slot) = self.arena.enemy_mut(id) {
                *slot = next;
                self.arena.update_spatial(id);
            }
        }
        removals
    }

    fn step_turrets(&mut self, dt: f32) -> Vec<TargetChange> {
        let arena = &self.arena;
        let turrets: Vec<(EntityId, &TurretComponents)> = arena.turrets().collect();
        let mut tracked: Vec<(EntityId, TurretComponents, TrackOutcome)> = turrets
            .par_iter()
            .map(|(id, turret)| {
                let mut next = (*turret).clone();
                let outcome = next.update(dt, arena);
                (*id, next, outcome)
            })
            .collect();
        tracked.sort_by_key(|(id, ..)| *id);

        let mut changes = Vec::new();
        for (id, next, outcome) in tracked {
            if let Some(slot) = self.arena.turret_mut(id) {
                *slot = next;
            }
            if !outcome.is_unchanged() {
                tracing::debug!(
                    turret = %id,
                    lost = ?outcome.lost,
                    acquired = ?outcome.acquired,
                    "target lock changed"
                );
                changes.push(TargetChange {
                    turret: id,
                    outcome,
                });
            }
        }
        changes
    }

    // -------------------------------------------------------------------------
    // Damage
    // -------------------------------------------------------------------------

    /// Deals `amount` damage to enemy `id`.
    ///
    /// Returns `Some(Defeated)` if this killed it; the enemy is removed from
    /// the arena at once. Unknown IDs are ignored.
    pub fn damage_enemy(&mut self, id: EntityId, amount: i32) -> Option<RemovalCause> {
        self.hit_enemy(id, amount, HitEffect::None)
    }

    /// Deals `amount` damage to enemy `id` and applies `effect` if it
    /// survives.
    pub fn hit_enemy(
        &mut self,
        id: EntityId,
        amount: i32,
        effect: HitEffect,
    ) -> Option<RemovalCause> {
        let enemy = self.arena.enemy_mut(id)?;
        let cause = enemy.apply_hit(id, amount, effect, self.director.notifier());
        if cause.is_some() {
            self.arena.despawn(id);
        }
        cause
    }

    /// Has turret `turret` hit its locked target for `amount`, with the
    /// turret's own hit effect.
    ///
    /// Returns the target and the removal cause, if any. `None` if the
    /// turret is unknown or holds no resolvable target.
    pub fn turret_strike(
        &mut self,
        turret: EntityId,
        amount: i32,
    ) -> Option<(EntityId, Option<RemovalCause>)> {
        let (target, effect) = {
            let t = self.arena.turret(turret)?;
            (t.target?, t.hit_effect)
        };
        if self.arena.enemy(target).is_none() {
            return None;
        }
        Some((target, self.hit_enemy(target, amount, effect)))
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Ends the session: the pending wave start is cancelled and no new wave
    /// begins. Enemies already on the path keep walking if ticked.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.director.cancel();
        tracing::info!(
            tick = self.arena.current_tick(),
            wave = self.director.current_wave(),
            "session ended"
        );
    }

    /// Returns `true` once [`end`](Self::end) has been called.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Read-only view of the arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The wave director.
    #[must_use]
    pub const fn director(&self) -> &WaveDirector {
        &self.director
    }

    /// The path every enemy walks.
    #[must_use]
    pub const fn path(&self) -> &PathCatalog {
        &self.path
    }

    /// Configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ticks executed so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Simulated seconds so far.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Captures the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tick: self.arena.current_tick(),
            elapsed: self.elapsed,
            wave: self.director.snapshot(),
            enemies: self
                .arena
                .enemies()
                .map(|(id, e)| (id, e.clone()))
                .collect(),
            turrets: self
                .arena
                .turrets()
                .map(|(id, t)| (id, t.clone()))
                .collect(),
        }
    }
}
