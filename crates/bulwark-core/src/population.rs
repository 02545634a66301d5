//! Population accounting between the wave director and its enemies.
//!
//! The director owns a single removal channel. Each enemy reports its own
//! termination through a [`RemovalNotifier`] cloned from that channel, and
//! the director drains the receiving end into a [`PopulationCounter`].
//! Enemies guard the send with their lifecycle state, so each one reports
//! at most once no matter how it dies.
//!
//! # Example
//!
//! ```
//! use bulwark_core::population::{removal_channel, PopulationCounter, Removal, RemovalCause};
//! use bulwark_core::entity::EntityId;
//!
//! let (notifier, receiver) = removal_channel();
//! let mut alive = PopulationCounter::new();
//! alive.increment();
//!
//! notifier.notify(Removal::new(EntityId::new(0), RemovalCause::Defeated));
//! for removal in receiver.drain() {
//!     alive.decrement(removal);
//! }
//! assert_eq!(alive.get(), 0);
//! ```

use std::fmt;

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Why an enemy left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Walked past the last waypoint.
    ReachedEnd,
    /// Health dropped to zero.
    Defeated,
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReachedEnd => write!(f, "reached end"),
            Self::Defeated => write!(f, "defeated"),
        }
    }
}

/// One "enemy removed" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Removal {
    /// The enemy that left.
    pub id: EntityId,
    /// How it left.
    pub cause: RemovalCause,
}

impl Removal {
    /// Creates a notification.
    #[must_use]
    pub const fn new(id: EntityId, cause: RemovalCause) -> Self {
        Self { id, cause }
    }
}

/// Creates a connected notifier/receiver pair.
#[must_use]
pub fn removal_channel() -> (RemovalNotifier, RemovalReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (RemovalNotifier { tx }, RemovalReceiver { rx })
}

/// Sending half of the removal channel. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct RemovalNotifier {
    tx: Sender<Removal>,
}

impl RemovalNotifier {
    /// Reports a removal.
    ///
    /// A disconnected receiver means the director is gone; the report is
    /// dropped since nobody is left to count it.
    pub fn notify(&self, removal: Removal) {
        if self.tx.send(removal).is_err() {
            tracing::debug!(id = %removal.id, "removal reported after director shut down");
        }
    }
}

/// Receiving half of the removal channel. Exactly one exists per channel.
#[derive(Debug)]
pub struct RemovalReceiver {
    rx: Receiver<Removal>,
}

impl RemovalReceiver {
    /// Takes every pending removal without blocking.
    pub fn drain(&self) -> impl Iterator<Item = Removal> + '_ {
        self.rx.try_iter()
    }

    /// Number of removals waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Count of live enemies. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounter {
    alive: u32,
    underflows: u32,
}

impl PopulationCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            alive: 0,
            underflows: 0,
        }
    }

    /// Records a spawn.
    pub fn increment(&mut self) {
        self.alive = self.alive.saturating_add(1);
    }

    /// Records a removal, clamping at zero.
    ///
    /// A removal arriving while the count is already zero means some enemy
    /// reported twice. Debug builds assert; release builds log and clamp.
    pub fn decrement(&mut self, removal: Removal) {
        if self.alive == 0 {
            self.underflows = self.underflows.saturating_add(1);
            tracing::error!(
                id = %removal.id,
                cause = %removal.cause,
                "population underflow: removal with no live enemies"
            );
            debug_assert!(false, "population underflow for enemy {}", removal.id);
            return;
        }
        self.alive -= 1;
    }

    /// Current live count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.alive
    }

    /// Number of clamped underflows seen so far.
    #[must_use]
    pub const fn underflows(&self) -> u32 {
        self.underflows
    }
}
