//! Entity storage and the world services the simulation consumes.
//!
//! The simulation core talks to the world through two narrow traits:
//!
//! - [`SpawnService`]: "create an enemy of this profile at this position"
//! - [`SpatialQuery`]: "which entities on these layers are within radius R of
//!   point P" and "where is entity I, if it still exists"
//!
//! [`Arena`] is the in-crate implementation of both, used by
//! [`Session`](crate::session::Session) and by tests. A host engine can
//! implement the traits over its own scene graph and physics instead.
//!
//! # Determinism
//!
//! Entities live in a `BTreeMap` keyed by monotonically assigned IDs, and
//! range queries return IDs in ascending order. Iteration and query order are
//! therefore stable across runs and platforms.
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is NOT updated automatically when a position changes
//! through `get_mut()`. Call `update_spatial(id)` afterwards. Spawning and
//! despawning keep the index in sync on their own.
//!
//! # Example
//!
//! ```
//! use bulwark_core::arena::{Arena, SpatialQuery};
//! use bulwark_core::config::EnemyProfile;
//! use bulwark_core::entity::{EnemyComponents, EntityInner, Layer};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let id = arena.spawn(EntityInner::Enemy(EnemyComponents::new(
//!     EnemyProfile::basic(),
//!     Vec2::new(3.0, 0.0),
//! )));
//!
//! assert_eq!(arena.query_in_range(Vec2::ZERO, 5.0, Layer::ENEMY), vec![id]);
//! assert!(arena.query_in_range(Vec2::ZERO, 5.0, Layer::TURRET).is_empty());
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::EnemyProfile;
use crate::entity::{EnemyComponents, Entity, EntityId, EntityInner, Layer, TurretComponents};

// =============================================================================
// Service Traits
// =============================================================================

/// Creates enemies on behalf of the wave director.
pub trait SpawnService {
    /// Instantiates an enemy of `profile` at `position` and returns its live
    /// handle.
    fn spawn_enemy(&mut self, profile: &EnemyProfile, position: Vec2) -> EntityId;
}

/// Read-only spatial lookups used by turret targeting.
pub trait SpatialQuery {
    /// IDs of entities on any layer in `mask` within `radius` of `center`
    /// (boundary inclusive), in a stable order.
    fn query_in_range(&self, center: Vec2, radius: f32, mask: Layer) -> Vec<EntityId>;

    /// Position of `id`, or `None` if it no longer exists.
    fn position_of(&self, id: EntityId) -> Option<Vec2>;
}

// =============================================================================
// Spatial Index
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct IndexEntry {
    position: Vec2,
    layer: Layer,
}

/// Layer-aware proximity index.
///
/// Radius queries are a linear scan. `HashMap` iteration order never leaks:
/// results are sorted by ID before they are returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    entries: HashMap<EntityId, IndexEntry>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts or updates an entity's position and layer.
    pub fn insert(&mut self, id: EntityId, position: Vec2, layer: Layer) {
        self.entries.insert(id, IndexEntry { position, layer });
    }

    /// Removes an entity. Removing an unknown ID is a no-op.
    pub fn remove(&mut self, id: EntityId) {
        self.entries.remove(&id);
    }

    /// Returns the indexed position of an entity, if known.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec2> {
        self.entries.get(&id).map(|e| e.position)
    }

    /// Entities on any layer in `mask` within `radius` of `center`, sorted
    /// by ID.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32, mask: Layer) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.layer.intersects(mask))
            .filter(|(_, e)| center.distance_squared(e.position) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        results.sort_unstable();
        results
    }

    /// Returns the number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container for every live enemy and turret.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    spatial: SpatialIndex,
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity and indexes it on its tag's layer.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        self.spatial
            .insert(id, inner.position(), inner.tag().layer());
        self.entities.insert(id, Entity::new(id, inner));
        id
    }

    /// Removes an entity.
    ///
    /// Idempotent: despawning an unknown or already removed ID returns
    /// `None` and changes nothing.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns `true` if `id` is still present.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Enemy component lookup.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&EnemyComponents> {
        self.get(id).and_then(Entity::as_enemy)
    }

    /// Mutable enemy component lookup.
    #[must_use]
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut EnemyComponents> {
        self.get_mut(id).and_then(Entity::as_enemy_mut)
    }

    /// Turret component lookup.
    #[must_use]
    pub fn turret(&self, id: EntityId) -> Option<&TurretComponents> {
        self.get(id).and_then(Entity::as_turret)
    }

    /// Mutable turret component lookup.
    #[must_use]
    pub fn turret_mut(&mut self, id: EntityId) -> Option<&mut TurretComponents> {
        self.get_mut(id).and_then(Entity::as_turret_mut)
    }

    /// Enemies in ID order.
    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &EnemyComponents)> + '_ {
        self.entities
            .values()
            .filter_map(|e| e.as_enemy().map(|c| (e.id(), c)))
    }

    /// Turrets in ID order.
    pub fn turrets(&self) -> impl Iterator<Item = (EntityId, &TurretComponents)> + '_ {
        self.entities
            .values()
            .filter_map(|e| e.as_turret().map(|c| (e.id(), c)))
    }

    /// Number of enemies present.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies().count()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Re-indexes `id` at its current position.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.spatial
                .insert(id, entity.position(), entity.tag().layer());
        }
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

impl SpawnService for Arena {
    fn spawn_enemy(&mut self, profile: &EnemyProfile, position: Vec2) -> EntityId {
        self.spawn(EntityInner::Enemy(EnemyComponents::new(*profile, position)))
    }
}

impl SpatialQuery for Arena {
    fn query_in_range(&self, center: Vec2, radius: f32, mask: Layer) -> Vec<EntityId> {
        self.spatial.query_radius(center, radius, mask)
    }

    fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.get(id).map(Entity::position)
    }
}

// =============================================================================
// Tests
// =============================================================================
