//! Entity types for the simulation.
//!
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification (enemy or turret)
//! - [`Layer`]: Collision-style layer mask used by range queries
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container
//!
//! Enemy and turret variants are pure data: a fast enemy and a tank differ
//! only in the numbers their [`EnemyProfile`](crate::config::EnemyProfile)
//! carries, and an ice turret differs from a fire turret only in its
//! [`HitEffect`].
//!
//! # Example
//!
//! ```
//! use bulwark_core::entity::{Entity, EntityId, EntityInner, EntityTag};
//! use bulwark_core::entity::components::TurretComponents;
//! use bulwark_core::config::TurretProfile;
//! use glam::Vec2;
//!
//! let turret = Entity::new(
//!     EntityId::new(7),
//!     EntityInner::Turret(TurretComponents::new(TurretProfile::fire(), Vec2::ZERO)),
//! );
//!
//! assert_eq!(turret.id().as_u64(), 7);
//! assert_eq!(turret.tag(), EntityTag::Turret);
//! ```

pub mod components;

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use components::{EnemyComponents, HitEffect, Lifecycle, TurretComponents};

/// Unique identifier for an entity.
///
/// IDs are assigned monotonically by the [`Arena`](crate::arena::Arena) and
/// never reused, so a stale ID held by a turret can only ever resolve to
/// nothing, never to a different enemy.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Entity type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Path-walking hostile unit.
    Enemy,
    /// Stationary defender.
    Turret,
}

impl EntityTag {
    /// Layer an entity of this tag is indexed on.
    #[must_use]
    pub const fn layer(self) -> Layer {
        match self {
            Self::Enemy => Layer::ENEMY,
            Self::Turret => Layer::TURRET,
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enemy => write!(f, "Enemy"),
            Self::Turret => write!(f, "Turret"),
        }
    }
}

bitflags! {
    /// Layer mask for range queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Layer: u8 {
        /// Enemies.
        const ENEMY = 1;
        /// Turrets.
        const TURRET = 1 << 1;
    }
}

/// Type-safe storage for entity-specific components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Enemy components.
    Enemy(EnemyComponents),
    /// Turret components.
    Turret(TurretComponents),
}

impl EntityInner {
    /// Returns the tag matching this variant.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Turret(_) => EntityTag::Turret,
        }
    }

    /// Current position of the entity.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        match self {
            Self::Enemy(c) => c.position,
            Self::Turret(c) => c.position,
        }
    }
}

/// A complete entity in the simulation.
///
/// The tag is derived from the inner variant, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates an entity.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns the entity's current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.inner.position()
    }

    /// Returns a reference to the inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns `true` if this entity is an enemy.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self.inner, EntityInner::Enemy(_))
    }

    /// Returns `true` if this entity is a turret.
    #[must_use]
    pub const fn is_turret(&self) -> bool {
        matches!(self.inner, EntityInner::Turret(_))
    }

    /// Returns the enemy components, if this is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyComponents> {
        match &self.inner {
            EntityInner::Enemy(c) => Some(c),
            EntityInner::Turret(_) => None,
        }
    }

    /// Returns mutable enemy components, if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyComponents> {
        match &mut self.inner {
            EntityInner::Enemy(c) => Some(c),
            EntityInner::Turret(_) => None,
        }
    }

    /// Returns the turret components, if this is a turret.
    #[must_use]
    pub const fn as_turret(&self) -> Option<&TurretComponents> {
        match &self.inner {
            EntityInner::Turret(c) => Some(c),
            EntityInner::Enemy(_) => None,
        }
    }

    /// Returns mutable turret components, if this is a turret.
    #[must_use]
    pub fn as_turret_mut(&mut self) -> Option<&mut TurretComponents> {
        match &mut self.inner {
            EntityInner::Turret(c) => Some(c),
            EntityInner::Enemy(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyProfile, TurretProfile};

    #[test]
    fn entity_id_ordering_and_display() {
        let a = EntityId::new(1);
        let b = EntityId::from(2);
        assert!(a < b);
        assert_eq!(format!("{a}"), "1");
        assert_eq!(format!("{a:?}"), "EntityId(1)");
    }

    #[test]
    fn tag_follows_inner_variant() {
        let enemy = Entity::new(
            EntityId::new(0),
            EntityInner::Enemy(EnemyComponents::new(EnemyProfile::basic(), Vec2::ZERO)),
        );
        let turret = Entity::new(
            EntityId::new(1),
            EntityInner::Turret(TurretComponents::new(TurretProfile::fire(), Vec2::ONE)),
        );

        assert_eq!(enemy.tag(), EntityTag::Enemy);
        assert!(enemy.is_enemy());
        assert!(enemy.as_turret().is_none());
        assert_eq!(turret.tag(), EntityTag::Turret);
        assert!(turret.is_turret());
        assert_eq!(turret.position(), Vec2::ONE);
    }

    #[test]
    fn tags_map_to_layers() {
        assert_eq!(EntityTag::Enemy.layer(), Layer::ENEMY);
        assert_eq!(EntityTag::Turret.layer(), Layer::TURRET);
        assert!(Layer::all().contains(Layer::ENEMY | Layer::TURRET));
        assert!(!Layer::ENEMY.intersects(Layer::TURRET));
    }

    #[test]
    fn layer_serializes_as_bits() {
        let json = serde_json::to_string(&(Layer::ENEMY | Layer::TURRET)).unwrap();
        let back: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Layer::ENEMY | Layer::TURRET);
    }
}
