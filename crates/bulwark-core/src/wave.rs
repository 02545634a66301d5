//! Wave scheduling.
//!
//! [`WaveDirector`] runs the wave state machine:
//!
//! ```text
//! Idle ──(deferred start)──▶ Spawning ──(quota emitted)──▶ WaitingClear
//!   ▲                                                          │
//!   └───────────────────(population reaches 0)─────────────────┘
//! ```
//!
//! Wave 1 starts on the first tick. Every later wave starts
//! `time_between_waves` seconds after the previous one cleared; the wave
//! number is bumped when that deferred start fires.
//!
//! While spawning, elapsed time accumulates until it reaches the spawn
//! interval. At most one enemy is emitted per tick and the accumulator is
//! then reset to zero, so a long tick does not produce a burst of catch-up
//! spawns.
//!
//! The director owns the receiving end of the removal channel. Removals are
//! drained at the start of each tick, before any transition is evaluated.
//!
//! # Example
//!
//! ```
//! use bulwark_core::arena::Arena;
//! use bulwark_core::config::{EnemyProfile, WaveConfig};
//! use bulwark_core::path::PathCatalog;
//! use bulwark_core::wave::{WaveDirector, WaveEvent, WavePhase};
//! use glam::Vec2;
//!
//! let path = PathCatalog::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0)]).unwrap();
//! let mut arena = Arena::new();
//! let mut director =
//!     WaveDirector::new(WaveConfig::default(), vec![EnemyProfile::basic()], 7).unwrap();
//!
//! let events = director.tick(0.1, &mut arena, &path);
//! assert_eq!(events, vec![WaveEvent::WaveStarted { wave: 1, quota: 8 }]);
//! assert_eq!(director.phase(), WavePhase::Spawning);
//! ```

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::arena::SpawnService;
use crate::config::{EnemyKind, EnemyProfile, WaveConfig};
use crate::entity::EntityId;
use crate::error::{BulwarkResult, ConfigError};
use crate::path::PathCatalog;
use crate::population::{removal_channel, PopulationCounter, RemovalNotifier, RemovalReceiver};

// =============================================================================
// Phase and Events
// =============================================================================

/// Where the director is in the wave cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Between waves, possibly counting down to the next one.
    Idle,
    /// Emitting the current wave's quota.
    Spawning,
    /// Quota emitted, waiting for the population to reach zero.
    WaitingClear,
}

impl fmt::Display for WavePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Spawning => write!(f, "spawning"),
            Self::WaitingClear => write!(f, "waiting for clear"),
        }
    }
}

/// Observable transition produced by [`WaveDirector::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveEvent {
    /// A wave entered `Spawning` with this quota.
    WaveStarted {
        /// Wave number, starting at 1.
        wave: u32,
        /// Enemies this wave will emit.
        quota: u32,
    },
    /// One enemy was created through the spawn service.
    EnemySpawned {
        /// Wave the enemy belongs to.
        wave: u32,
        /// Handle returned by the spawn service.
        id: EntityId,
        /// Kind drawn from the roster.
        kind: EnemyKind,
    },
    /// The wave's whole quota has been emitted.
    SpawningComplete {
        /// Wave number.
        wave: u32,
    },
    /// Every enemy of the wave has left the simulation.
    WaveCleared {
        /// Wave number.
        wave: u32,
    },
}

/// Serializable view of the director's state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSnapshot {
    /// Current wave number.
    pub wave: u32,
    /// Current phase.
    pub phase: WavePhase,
    /// Live enemy count.
    pub enemies_alive: u32,
    /// Enemies of this wave not yet emitted.
    pub enemies_left_to_spawn: u32,
    /// Spawn accumulator in seconds.
    pub time_since_last_spawn: f32,
    /// Seconds until the deferred wave start fires, if one is scheduled.
    pub next_wave_in: Option<f32>,
    /// Whether the director was cancelled.
    pub cancelled: bool,
}

// =============================================================================
// Wave Director
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingStart {
    wave: u32,
    remaining: f32,
}

/// Owns wave numbering, the spawn timer and the "wave cleared" gate.
#[derive(Debug)]
pub struct WaveDirector {
    config: WaveConfig,
    roster: Vec<EnemyProfile>,
    rng: ChaCha8Rng,
    current_wave: u32,
    phase: WavePhase,
    alive: PopulationCounter,
    enemies_left_to_spawn: u32,
    time_since_last_spawn: f32,
    pending_start: Option<PendingStart>,
    cancelled: bool,
    notifier: RemovalNotifier,
    removals: RemovalReceiver,
}

impl WaveDirector {
    /// Creates a director that will start wave 1 on its first tick.
    ///
    /// Enemy kinds are drawn uniformly from `roster` with an RNG seeded from
    /// `seed`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` or any roster entry is invalid,
    /// or if the roster is empty.
    pub fn new(config: WaveConfig, roster: Vec<EnemyProfile>, seed: u64) -> BulwarkResult<Self> {
        config.validate()?;
        if roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        for profile in &roster {
            profile.validate()?;
        }

        let (notifier, removals) = removal_channel();
        Ok(Self {
            config,
            roster,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current_wave: 1,
            phase: WavePhase::Idle,
            alive: PopulationCounter::new(),
            enemies_left_to_spawn: 0,
            time_since_last_spawn: 0.0,
            pending_start: Some(PendingStart {
                wave: 1,
                remaining: 0.0,
            }),
            cancelled: false,
            notifier,
            removals,
        })
    }

    /// Advances the director by `dt` seconds.
    ///
    /// Spawns at most one enemy through `spawner`, at the start of `path`.
    /// Returns the transitions that happened, in order. A cancelled director
    /// still drains removals but never transitions again.
    pub fn tick(
        &mut self,
        dt: f32,
        spawner: &mut impl SpawnService,
        path: &PathCatalog,
    ) -> Vec<WaveEvent> {
        let mut events = Vec::new();
        let dt = dt.max(0.0);

        self.drain_removals();
        if self.cancelled {
            return events;
        }

        match self.phase {
            WavePhase::Idle => self.tick_idle(dt, &mut events),
            WavePhase::Spawning => self.tick_spawning(dt, spawner, path, &mut events),
            WavePhase::WaitingClear => {}
        }

        if self.phase == WavePhase::Spawning && self.enemies_left_to_spawn == 0 {
            self.phase = WavePhase::WaitingClear;
            tracing::info!(wave = self.current_wave, "wave fully spawned");
            events.push(WaveEvent::SpawningComplete {
                wave: self.current_wave,
            });
        }

        if self.phase == WavePhase::WaitingClear && self.alive.get() == 0 {
            self.finish_wave(&mut events);
        }

        events
    }

    /// Applies every pending removal to the population counter.
    ///
    /// Returns how many were applied. [`tick`](Self::tick) calls this first,
    /// so hosts only need it to observe the count between ticks.
    pub fn drain_removals(&mut self) -> usize {
        let mut applied = 0;
        for removal in self.removals.drain() {
            self.alive.decrement(removal);
            applied += 1;
        }
        applied
    }

    /// Cancels the pending deferred wave start and stops the cycle.
    ///
    /// Idempotent. Enemies already spawned keep reporting removals.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if let Some(pending) = self.pending_start.take() {
            tracing::info!(wave = pending.wave, "pending wave start cancelled");
        }
        tracing::info!(wave = self.current_wave, "wave director cancelled");
    }

    // -------------------------------------------------------------------------
    // Phase handlers
    // -------------------------------------------------------------------------

    fn tick_idle(&mut self, dt: f32, events: &mut Vec<WaveEvent>) {
        let Some(pending) = self.pending_start.as_mut() else {
            return;
        };
        pending.remaining -= dt;
        if pending.remaining > 0.0 {
            return;
        }
        let wave = pending.wave;
        self.pending_start = None;
        self.start_wave(wave, events);
    }

    fn start_wave(&mut self, wave: u32, events: &mut Vec<WaveEvent>) {
        let quota = self.config.quota(wave);
        self.current_wave = wave;
        self.enemies_left_to_spawn = quota;
        self.time_since_last_spawn = 0.0;
        self.phase = WavePhase::Spawning;
        tracing::info!(wave, quota, "wave started");
        events.push(WaveEvent::WaveStarted { wave, quota });
    }

    fn tick_spawning(
        &mut self,
        dt: f32,
        spawner: &mut impl SpawnService,
        path: &PathCatalog,
        events: &mut Vec<WaveEvent>,
    ) {
        self.time_since_last_spawn += dt;
        if self.time_since_last_spawn < self.config.spawn_interval()
            || self.enemies_left_to_spawn == 0
        {
            return;
        }

        let profile = self.roster[self.rng.gen_range(0..self.roster.len())];
        let id = spawner.spawn_enemy(&profile, path.start());
        self.alive.increment();
        self.enemies_left_to_spawn -= 1;
        self.time_since_last_spawn = 0.0;

        tracing::debug!(
            wave = self.current_wave,
            %id,
            kind = %profile.kind,
            left = self.enemies_left_to_spawn,
            "enemy spawned"
        );
        events.push(WaveEvent::EnemySpawned {
            wave: self.current_wave,
            id,
            kind: profile.kind,
        });
    }

    fn finish_wave(&mut self, events: &mut Vec<WaveEvent>) {
        let wave = self.current_wave;
        self.phase = WavePhase::Idle;
        self.time_since_last_spawn = 0.0;
        self.pending_start = Some(PendingStart {
            wave: wave.saturating_add(1),
            remaining: self.config.time_between_waves,
        });
        tracing::info!(
            wave,
            next_in = self.config.time_between_waves,
            "wave cleared"
        );
        events.push(WaveEvent::WaveCleared { wave });
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Handle enemies use to report their removal.
    #[must_use]
    pub fn notifier(&self) -> &RemovalNotifier {
        &self.notifier
    }

    /// Current wave number, starting at 1.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Live enemy count as of the last drain.
    #[must_use]
    pub const fn enemies_alive(&self) -> u32 {
        self.alive.get()
    }

    /// Enemies of the current wave not yet emitted.
    #[must_use]
    pub const fn enemies_left_to_spawn(&self) -> u32 {
        self.enemies_left_to_spawn
    }

    /// Spawn accumulator in seconds.
    #[must_use]
    pub const fn time_since_last_spawn(&self) -> f32 {
        self.time_since_last_spawn
    }

    /// Seconds until the deferred wave start fires, if one is scheduled.
    #[must_use]
    pub fn next_wave_in(&self) -> Option<f32> {
        self.pending_start.map(|p| p.remaining.max(0.0))
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Population underflows clamped so far.
    #[must_use]
    pub const fn population_underflows(&self) -> u32 {
        self.alive.underflows()
    }

    /// Wave parameters in use.
    #[must_use]
    pub const fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Serializable view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WaveSnapshot {
        WaveSnapshot {
            wave: self.current_wave,
            phase: self.phase,
            enemies_alive: self.alive.get(),
            enemies_left_to_spawn: self.enemies_left_to_spawn,
            time_since_last_spawn: self.time_since_last_spawn,
            next_wave_in: self.next_wave_in(),
            cancelled: self.cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::arena::Arena;
    use crate::population::{Removal, RemovalCause};

    fn path() -> PathCatalog {
        PathCatalog::new(vec![Vec2::new(1.0, 1.0), Vec2::new(10.0, 1.0)]).unwrap()
    }

    fn fast_config(base_enemies: u32) -> WaveConfig {
        WaveConfig {
            base_enemies,
            enemies_per_second: 10.0,
            time_between_waves: 1.0,
            ..WaveConfig::default()
        }
    }

    fn director(config: WaveConfig) -> WaveDirector {
        WaveDirector::new(config, vec![EnemyProfile::basic()], 1).unwrap()
    }

    fn spawned_ids(events: &[WaveEvent]) -> Vec<EntityId> {
        events
            .iter()
            .filter_map(|e| match e {
                WaveEvent::EnemySpawned { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn kill_all(director: &WaveDirector, ids: &[EntityId]) {
        for id in ids {
            director
                .notifier()
                .notify(Removal::new(*id, RemovalCause::Defeated));
        }
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn rejects_invalid_config() {
            let config = WaveConfig {
                enemies_per_second: 0.0,
                ..WaveConfig::default()
            };
            assert!(matches!(
                WaveDirector::new(config, vec![EnemyProfile::basic()], 0),
                Err(ConfigError::NonPositiveSpawnRate(_))
            ));
        }

        #[test]
        fn rejects_empty_roster() {
            assert!(matches!(
                WaveDirector::new(WaveConfig::default(), Vec::new(), 0),
                Err(ConfigError::EmptyRoster)
            ));
        }

        #[test]
        fn starts_idle_on_wave_one() {
            let d = director(WaveConfig::default());
            assert_eq!(d.phase(), WavePhase::Idle);
            assert_eq!(d.current_wave(), 1);
            assert_eq!(d.next_wave_in(), Some(0.0));
        }
    }

    mod spawning_tests {
        use super::*;

        #[test]
        fn first_tick_starts_wave_one_immediately() {
            let mut arena = Arena::new();
            let mut d = director(WaveConfig::default());
            let events = d.tick(0.016, &mut arena, &path());
            assert_eq!(events, vec![WaveEvent::WaveStarted { wave: 1, quota: 8 }]);
            assert_eq!(d.enemies_left_to_spawn(), 8);
            assert!(arena.is_empty());
        }

        #[test]
        fn spawns_once_interval_elapses() {
            let mut arena = Arena::new();
            let mut d = director(WaveConfig::default());
            let path = path();
            d.tick(0.25, &mut arena, &path);

            // Interval is 2s at 0.5 enemies per second.
            for _ in 0..7 {
                assert!(spawned_ids(&d.tick(0.25, &mut arena, &path)).is_empty());
            }
            let events = d.tick(0.25, &mut arena, &path);
            let ids = spawned_ids(&events);
            assert_eq!(ids.len(), 1);
            assert_eq!(d.enemies_alive(), 1);
            assert_eq!(d.enemies_left_to_spawn(), 7);
            assert_eq!(arena.enemy(ids[0]).unwrap().position, Vec2::new(1.0, 1.0));
        }

        #[test]
        fn long_tick_spawns_one_and_discards_excess() {
            let mut arena = Arena::new();
            let mut d = director(WaveConfig::default());
            let path = path();
            d.tick(0.0, &mut arena, &path);

            let events = d.tick(10.0, &mut arena, &path);
            assert_eq!(spawned_ids(&events).len(), 1);
            assert!(d.time_since_last_spawn().abs() < f32::EPSILON);
        }

        #[test]
        fn never_exceeds_quota() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(3));
            let path = path();

            let mut spawned = 0;
            for _ in 0..100 {
                spawned += spawned_ids(&d.tick(0.2, &mut arena, &path)).len();
            }
            assert_eq!(spawned, 3);
            assert_eq!(d.enemies_left_to_spawn(), 0);
            assert_eq!(d.phase(), WavePhase::WaitingClear);
            assert_eq!(arena.enemy_count(), 3);
        }

        #[test]
        fn spawning_complete_follows_last_spawn() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(1));
            let path = path();
            d.tick(0.0, &mut arena, &path);

            let events = d.tick(0.2, &mut arena, &path);
            assert!(matches!(events[0], WaveEvent::EnemySpawned { wave: 1, .. }));
            assert_eq!(events[1], WaveEvent::SpawningComplete { wave: 1 });
            assert_eq!(d.phase(), WavePhase::WaitingClear);
        }

        #[test]
        fn roster_draw_is_seeded() {
            let roster = vec![EnemyProfile::fast(), EnemyProfile::tank()];
            let kinds = |seed| {
                let mut arena = Arena::new();
                let mut d = WaveDirector::new(fast_config(8), roster.clone(), seed).unwrap();
                (0..50)
                    .flat_map(|_| d.tick(0.2, &mut arena, &path()))
                    .filter_map(|e| match e {
                        WaveEvent::EnemySpawned { kind, .. } => Some(kind),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
            };
            assert_eq!(kinds(9), kinds(9));
            assert_eq!(kinds(9).len(), 8);
        }
    }

    mod clearing_tests {
        use super::*;

        #[test]
        fn waits_for_population_before_clearing() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(2));
            let path = path();

            let mut ids = Vec::new();
            for _ in 0..5 {
                ids.extend(spawned_ids(&d.tick(0.2, &mut arena, &path)));
            }
            assert_eq!(ids.len(), 2);
            assert_eq!(d.phase(), WavePhase::WaitingClear);

            kill_all(&d, &ids[..1]);
            assert!(d.tick(0.2, &mut arena, &path).is_empty());
            assert_eq!(d.enemies_alive(), 1);

            kill_all(&d, &ids[1..]);
            let events = d.tick(0.2, &mut arena, &path);
            assert_eq!(events, vec![WaveEvent::WaveCleared { wave: 1 }]);
            assert_eq!(d.phase(), WavePhase::Idle);
            assert_eq!(d.current_wave(), 1);
            assert_eq!(d.next_wave_in(), Some(1.0));
        }

        #[test]
        fn next_wave_starts_after_delay_with_bumped_number() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(1));
            let path = path();

            let mut ids = Vec::new();
            for _ in 0..3 {
                ids.extend(spawned_ids(&d.tick(0.2, &mut arena, &path)));
            }
            kill_all(&d, &ids);
            d.tick(0.25, &mut arena, &path);
            assert_eq!(d.phase(), WavePhase::Idle);

            for _ in 0..3 {
                assert!(d.tick(0.25, &mut arena, &path).is_empty());
            }
            let events = d.tick(0.25, &mut arena, &path);
            // 1 * 2^0.75 = 1.68, rounded up.
            assert_eq!(events, vec![WaveEvent::WaveStarted { wave: 2, quota: 2 }]);
            assert_eq!(d.current_wave(), 2);
        }

        #[test]
        fn removals_before_spawning_completes_do_not_clear_early() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(3));
            let path = path();

            d.tick(0.0, &mut arena, &path);
            let ids = spawned_ids(&d.tick(0.2, &mut arena, &path));
            kill_all(&d, &ids);
            let events = d.tick(0.0, &mut arena, &path);
            assert!(events.is_empty());
            assert_eq!(d.phase(), WavePhase::Spawning);
            assert_eq!(d.enemies_alive(), 0);
        }
    }

    mod cancellation_tests {
        use super::*;

        #[test]
        fn cancel_drops_pending_start() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(1));
            let path = path();

            d.cancel();
            assert!(d.is_cancelled());
            assert_eq!(d.next_wave_in(), None);
            for _ in 0..10 {
                assert!(d.tick(1.0, &mut arena, &path).is_empty());
            }
            assert_eq!(d.phase(), WavePhase::Idle);
            assert!(arena.is_empty());
        }

        #[test]
        fn cancel_between_waves_never_starts_next() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(1));
            let path = path();

            let mut ids = Vec::new();
            for _ in 0..3 {
                ids.extend(spawned_ids(&d.tick(0.2, &mut arena, &path)));
            }
            kill_all(&d, &ids);
            d.tick(0.2, &mut arena, &path);
            assert!(d.next_wave_in().is_some());

            d.cancel();
            d.cancel();
            for _ in 0..20 {
                assert!(d.tick(0.5, &mut arena, &path).is_empty());
            }
            assert_eq!(d.current_wave(), 1);
        }

        #[test]
        fn cancelled_director_still_counts_removals() {
            let mut arena = Arena::new();
            let mut d = director(fast_config(2));
            let path = path();

            let mut ids = Vec::new();
            for _ in 0..3 {
                ids.extend(spawned_ids(&d.tick(0.2, &mut arena, &path)));
            }
            d.cancel();
            kill_all(&d, &ids);
            d.tick(0.2, &mut arena, &path);
            assert_eq!(d.enemies_alive(), 0);
            assert_eq!(d.phase(), WavePhase::WaitingClear);
        }
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut arena = Arena::new();
        let mut d = director(WaveConfig::default());
        d.tick(0.5, &mut arena, &path());
        let snap = d.snapshot();
        assert_eq!(snap.wave, 1);
        assert_eq!(snap.phase, WavePhase::Spawning);
        assert_eq!(snap.enemies_left_to_spawn, 8);
        assert_eq!(snap.next_wave_in, None);
        assert!(!snap.cancelled);
    }
}
