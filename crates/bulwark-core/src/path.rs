//! The shared waypoint path.
//!
//! A [`PathCatalog`] is built once per level and is immutable afterwards.
//! Every enemy walks the same catalog, so it is handed out as a cheap
//! reference-counted clone rather than looked up through a global.
//!
//! [`PathSlot`] is the init-once holder a composition root can use when the
//! path arrives after the owner is constructed: the first initializer wins
//! and later ones are rejected with [`PathError::AlreadyInitialized`].
//!
//! # Example
//!
//! ```
//! use bulwark_core::path::{PathCatalog, PathSlot};
//! use glam::Vec2;
//!
//! let path = PathCatalog::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0)]).unwrap();
//! assert_eq!(path.len(), 2);
//! assert_eq!(path.total_length(), 10.0);
//!
//! let slot = PathSlot::new();
//! slot.init(path.clone()).unwrap();
//! assert!(slot.init(path).is_err());
//! ```

use std::sync::{Arc, OnceLock};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Ordered, immutable sequence of waypoints. Never empty.
///
/// Serializes as a plain waypoint list. Deserializing runs the same checks as
/// [`PathCatalog::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct PathCatalog {
    waypoints: Arc<[Vec2]>,
}

impl PathCatalog {
    /// Builds a catalog from waypoints in walking order.
    ///
    /// # Errors
    ///
    /// [`PathError::Empty`] for an empty list and
    /// [`PathError::NonFiniteWaypoint`] for NaN or infinite coordinates.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, PathError> {
        if waypoints.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(index) = waypoints.iter().position(|w| !w.is_finite()) {
            return Err(PathError::NonFiniteWaypoint { index });
        }
        Ok(Self {
            waypoints: waypoints.into(),
        })
    }

    /// Number of waypoints. Always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at `index`, or `None` past the end.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Spawn position: the first waypoint.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// The final waypoint.
    #[must_use]
    pub fn end(&self) -> Vec2 {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Sum of segment lengths from start to end.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Iterates waypoints in walking order.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.waypoints.iter().copied()
    }

    /// Returns `true` if both handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.waypoints, &other.waypoints)
    }
}

impl TryFrom<Vec<Vec2>> for PathCatalog {
    type Error = PathError;

    fn try_from(waypoints: Vec<Vec2>) -> Result<Self, Self::Error> {
        Self::new(waypoints)
    }
}

impl From<PathCatalog> for Vec<Vec2> {
    fn from(catalog: PathCatalog) -> Self {
        catalog.waypoints.to_vec()
    }
}

/// Init-once holder for the level path.
#[derive(Debug, Default)]
pub struct PathSlot {
    cell: OnceLock<PathCatalog>,
}

impl PathSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Stores `catalog` if the slot is still empty.
    ///
    /// # Errors
    ///
    /// [`PathError::AlreadyInitialized`] if a catalog is already stored; the
    /// stored catalog is left untouched and `catalog` is dropped.
    pub fn init(&self, catalog: PathCatalog) -> Result<&PathCatalog, PathError> {
        let mut installed = false;
        let stored = self.cell.get_or_init(|| {
            installed = true;
            catalog
        });
        if installed {
            Ok(stored)
        } else {
            tracing::warn!("rejected second path initializer");
            Err(PathError::AlreadyInitialized)
        }
    }

    /// The stored catalog, if initialized.
    #[must_use]
    pub fn get(&self) -> Option<&PathCatalog> {
        self.cell.get()
    }

    /// Returns `true` once a catalog has been stored.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_path() -> PathCatalog {
        PathCatalog::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_path_is_rejected() {
        assert_eq!(PathCatalog::new(vec![]), Err(PathError::Empty));
    }

    #[test]
    fn non_finite_waypoint_is_rejected() {
        let result = PathCatalog::new(vec![Vec2::ZERO, Vec2::new(f32::NAN, 1.0)]);
        assert_eq!(result, Err(PathError::NonFiniteWaypoint { index: 1 }));
    }

    #[test]
    fn lookup_by_index() {
        let path = l_path();
        assert_eq!(path.len(), 3);
        assert!(!path.is_empty());
        assert_eq!(path.waypoint(1), Some(Vec2::new(3.0, 0.0)));
        assert_eq!(path.waypoint(3), None);
        assert_eq!(path.start(), Vec2::ZERO);
        assert_eq!(path.end(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn single_waypoint_path() {
        let path = PathCatalog::new(vec![Vec2::new(2.0, 2.0)]).unwrap();
        assert_eq!(path.start(), path.end());
        assert_eq!(path.total_length(), 0.0);
    }

    #[test]
    fn total_length_sums_segments() {
        assert!((l_path().total_length() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn iter_preserves_order() {
        let points: Vec<_> = l_path().iter().collect();
        assert_eq!(points[0], Vec2::ZERO);
        assert_eq!(points[2], Vec2::new(3.0, 4.0));
    }

    #[test]
    fn clones_share_storage() {
        let path = l_path();
        let clone = path.clone();
        assert!(path.ptr_eq(&clone));
    }

    #[test]
    fn slot_first_initializer_wins() {
        let slot = PathSlot::new();
        assert!(!slot.is_initialized());

        let first = l_path();
        let second = PathCatalog::new(vec![Vec2::new(9.0, 9.0)]).unwrap();

        assert!(slot.init(first.clone()).is_ok());
        assert_eq!(slot.init(second), Err(PathError::AlreadyInitialized));
        assert!(slot.get().unwrap().ptr_eq(&first));
    }

    #[test]
    fn serialization_roundtrip() {
        let path = l_path();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[[0.0,0.0],[3.0,0.0],[3.0,4.0]]");
        let deserialized: PathCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, path);
    }

    #[test]
    fn deserializing_empty_path_fails() {
        let result = serde_json::from_str::<PathCatalog>("[]");
        let err = result.unwrap_err();
        assert!(err.to_string().contains(&PathError::Empty.to_string()));
    }
}
