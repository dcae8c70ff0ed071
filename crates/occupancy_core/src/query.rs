//! Spatial query service boundary.
//!
//! Classifiers never see the physics world directly; they ask a
//! [`SpatialQueryService`] three questions:
//!
//! | Query              | Used by                                  |
//! |--------------------|------------------------------------------|
//! | `closest_distance` | subdivision pruning                      |
//! | `overlap_aabb`     | overlap pruning / leaf confirmation      |
//! | `cast_ray`         | raycast sampler                          |
//!
//! Implementations must be safe to call from many worker threads at once and
//! must not change while a cycle is running.

use glam::Vec3;

use crate::bounds::{Aabb, QueryBox};
use crate::error::QueryError;

/// Opaque handle of a scene collider returned by overlap queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub u64);

/// Result of a closest-distance query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceDistance {
  /// Collider closest to the query shape.
  pub collider: ColliderHandle,
  /// Signed distance; negative values are penetration depth.
  pub distance: f32,
}

/// Read-only geometric queries against a 3D scene.
pub trait SpatialQueryService: Send + Sync {
  /// Closest collider whose signed distance to `shape` is `<= max_distance`.
  ///
  /// A negative `max_distance` only reports colliders the box penetrates by at
  /// least that much.
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError>;

  /// All colliders whose bounds overlap `aabb`.
  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError>;

  /// Whether the segment from `start` to `end` hits any collider.
  fn cast_ray(&self, start: Vec3, end: Vec3) -> Result<bool, QueryError>;
}

/// Blanket impl for boxed trait objects.
impl SpatialQueryService for Box<dyn SpatialQueryService> {
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError> {
    (**self).closest_distance(shape, max_distance)
  }

  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError> {
    (**self).overlap_aabb(aabb)
  }

  fn cast_ray(&self, start: Vec3, end: Vec3) -> Result<bool, QueryError> {
    (**self).cast_ray(start, end)
  }
}

impl<Q: SpatialQueryService + ?Sized> SpatialQueryService for &Q {
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError> {
    (**self).closest_distance(shape, max_distance)
  }

  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError> {
    (**self).overlap_aabb(aabb)
  }

  fn cast_ray(&self, start: Vec3, end: Vec3) -> Result<bool, QueryError> {
    (**self).cast_ray(start, end)
  }
}
