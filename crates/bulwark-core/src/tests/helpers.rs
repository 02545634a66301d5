//! Test helper functions for setting up sessions and driving them.

use glam::Vec2;

use crate::config::{EnemyProfile, SessionConfig, WaveConfig};
use crate::entity::EntityId;
use crate::path::PathCatalog;
use crate::population::Removal;
use crate::session::{Session, TickReport};
use crate::wave::WaveEvent;

/// Fixed step used by the scenario tests. Exactly representable, so
/// accumulated time has no rounding drift.
pub const DT: f32 = 0.125;

/// Installs a test-writer subscriber so `tracing` output shows up under
/// `cargo test -- --nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Scenario Setup
// =============================================================================

/// Straight path from the origin along +X.
pub fn straight_path(length: f32) -> PathCatalog {
    PathCatalog::new(vec![Vec2::ZERO, Vec2::new(length, 0.0)]).unwrap()
}

/// L-shaped path: east, then north.
pub fn corner_path() -> PathCatalog {
    PathCatalog::new(vec![
        Vec2::ZERO,
        Vec2::new(8.0, 0.0),
        Vec2::new(8.0, 8.0),
    ])
    .unwrap()
}

/// Session config with quick spawns and a one second break between waves.
pub fn quick_config(base_enemies: u32, roster: Vec<EnemyProfile>, seed: u64) -> SessionConfig {
    SessionConfig {
        wave: WaveConfig {
            base_enemies,
            enemies_per_second: 4.0,
            time_between_waves: 1.0,
            ..WaveConfig::default()
        },
        roster,
        seed,
        ..SessionConfig::default()
    }
}

/// Builds a session, panicking on invalid input.
pub fn session(config: SessionConfig, path: PathCatalog) -> Session {
    Session::new(config, path).unwrap()
}

// =============================================================================
// Driving
// =============================================================================

/// Everything observed while running a session for a number of ticks.
#[derive(Debug, Default)]
pub struct Recording {
    /// Per-tick reports, in order.
    pub reports: Vec<TickReport>,
}

impl Recording {
    /// All wave events in order, tagged with the tick they happened on.
    pub fn wave_events(&self) -> Vec<(u64, WaveEvent)> {
        self.reports
            .iter()
            .flat_map(|r| r.wave_events.iter().map(move |e| (r.tick, *e)))
            .collect()
    }

    /// IDs of every enemy spawned.
    pub fn spawned(&self) -> Vec<EntityId> {
        self.wave_events()
            .into_iter()
            .filter_map(|(_, e)| match e {
                WaveEvent::EnemySpawned { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Every removal reported by the enemy phase.
    pub fn removals(&self) -> Vec<Removal> {
        self.reports
            .iter()
            .flat_map(|r| r.removals.iter().copied())
            .collect()
    }

    /// Tick of the first event matching `pred`.
    pub fn first_tick(&self, pred: impl Fn(&WaveEvent) -> bool) -> Option<u64> {
        self.wave_events()
            .into_iter()
            .find(|(_, e)| pred(e))
            .map(|(tick, _)| tick)
    }
}

/// Ticks `session` `ticks` times with [`DT`].
pub fn run(session: &mut Session, ticks: usize) -> Recording {
    let mut recording = Recording::default();
    for _ in 0..ticks {
        recording.reports.push(session.tick(DT));
    }
    recording
}

/// Seconds represented by `ticks` steps of [`DT`].
#[allow(clippy::cast_precision_loss)]
pub fn seconds(ticks: u64) -> f32 {
    ticks as f32 * DT
}
