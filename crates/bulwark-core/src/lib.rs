//! # Bulwark Core
//!
//! Wave, path and targeting simulation core for Bulwark, a tower-defense
//! game.
//!
//! The crate simulates how enemies are produced in waves, how they walk a
//! fixed path, and how turrets acquire and track them. Rendering, physics,
//! input and scene management are left to the host; the core only consumes
//! the narrow services defined in [`arena`].
//!
//! ## Architecture
//!
//! - **[`path`]**: the shared, immutable waypoint sequence
//! - **[`wave`]**: the [`WaveDirector`] state machine, quota scaling and the
//!   spawn timer
//! - **[`enemy`]**: path traversal and damage for enemy components
//! - **[`turret`]**: target acquisition and rotation
//! - **[`population`]**: the removal channel coupling enemies to the director
//! - **[`session`]**: the composition root that ticks everything in order
//!
//! ## Usage
//!
//! ```
//! use bulwark_core::{PathCatalog, Session, SessionConfig, TurretProfile};
//! use glam::Vec2;
//!
//! let path = PathCatalog::new(vec![
//!     Vec2::new(0.0, 0.0),
//!     Vec2::new(10.0, 0.0),
//!     Vec2::new(10.0, 10.0),
//! ])?;
//! let mut session = Session::new(SessionConfig::default(), path)?;
//! session.place_turret(TurretProfile::ice(), Vec2::new(8.0, 2.0))?;
//!
//! for _ in 0..600 {
//!     let report = session.tick(1.0 / 60.0);
//!     for event in &report.wave_events {
//!         println!("{event:?}");
//!     }
//! }
//! # Ok::<(), bulwark_core::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod config;
pub mod enemy;
pub mod entity;
pub mod error;
pub mod path;
pub mod population;
pub mod session;
pub mod turret;
pub mod wave;

pub use arena::{Arena, SpatialQuery, SpawnService};
pub use config::{
    EnemyKind, EnemyProfile, QuotaRounding, Rotation, SessionConfig, TurretKind, TurretProfile,
    WaveConfig,
};
pub use entity::{EntityId, HitEffect, Layer};
pub use error::{BulwarkResult, ConfigError, PathError};
pub use path::{PathCatalog, PathSlot};
pub use population::{Removal, RemovalCause};
pub use session::{Session, SessionSnapshot, TickReport};
pub use wave::{WaveDirector, WaveEvent, WavePhase};

#[cfg(test)]
mod tests;
