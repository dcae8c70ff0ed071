//! Test utilities for classifier and cycle tests.
//!
//! Wraps a [`BoxScene`] with query counting and fault injection, and provides
//! the small grids used throughout the test suite.

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::{UVec2, Vec3};

use crate::bounds::{Aabb, QueryBox};
use crate::error::QueryError;
use crate::grid::GridSpec;
use crate::query::{ColliderHandle, SpatialQueryService, SurfaceDistance};
use crate::scene::BoxScene;
use crate::types::CellCoord;

// =============================================================================
// Grids and scenes
// =============================================================================

/// 4x4 grid of unit cells, origin at (-2, -2, 0).
pub fn grid_4x4() -> GridSpec {
  GridSpec::new(UVec2::new(4, 4), Vec3::ONE).expect("valid grid")
}

pub fn grid(width: u32, height: u32) -> GridSpec {
  GridSpec::new(UVec2::new(width, height), Vec3::ONE).expect("valid grid")
}

/// Solid box strictly inside one cell, straddling the grid plane.
pub fn obstacle_in_cell(grid: &GridSpec, cell: CellCoord) -> Aabb {
  let size = grid.cell_size();
  Aabb::from_center_half_extents(
    grid.cell_center(cell),
    Vec3::new(size.x * 0.4, size.y * 0.4, size.z * 0.5),
  )
}

pub fn scene_with_cells(grid: &GridSpec, cells: &[CellCoord]) -> BoxScene {
  BoxScene::from_boxes(cells.iter().map(|&c| obstacle_in_cell(grid, c)))
}

/// One slab covering the whole grid plane.
pub fn full_cover_scene(grid: &GridSpec) -> BoxScene {
  let slab = grid.rect_slab(&grid.full_rect());
  BoxScene::from_boxes([Aabb::new(
    slab.min - Vec3::new(1.0, 1.0, 0.0),
    slab.max + Vec3::new(1.0, 1.0, 0.0),
  )])
}

// =============================================================================
// Query wrappers
// =============================================================================

/// Counts every call per query kind.
pub struct CountingQuery<Q> {
  pub inner: Q,
  pub distance_calls: AtomicUsize,
  pub overlap_calls: AtomicUsize,
  pub ray_calls: AtomicUsize,
}

impl<Q> CountingQuery<Q> {
  pub fn new(inner: Q) -> Self {
    Self {
      inner,
      distance_calls: AtomicUsize::new(0),
      overlap_calls: AtomicUsize::new(0),
      ray_calls: AtomicUsize::new(0),
    }
  }

  pub fn distance_calls(&self) -> usize {
    self.distance_calls.load(Ordering::SeqCst)
  }

  pub fn overlap_calls(&self) -> usize {
    self.overlap_calls.load(Ordering::SeqCst)
  }

  pub fn ray_calls(&self) -> usize {
    self.ray_calls.load(Ordering::SeqCst)
  }

  pub fn total_calls(&self) -> usize {
    self.distance_calls() + self.overlap_calls() + self.ray_calls()
  }
}

impl<Q: SpatialQueryService> SpatialQueryService for CountingQuery<Q> {
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError> {
    self.distance_calls.fetch_add(1, Ordering::SeqCst);
    self.inner.closest_distance(shape, max_distance)
  }

  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError> {
    self.overlap_calls.fetch_add(1, Ordering::SeqCst);
    self.inner.overlap_aabb(aabb)
  }

  fn cast_ray(&self, start: Vec3, end: Vec3) -> Result<bool, QueryError> {
    self.ray_calls.fetch_add(1, Ordering::SeqCst);
    self.inner.cast_ray(start, end)
  }
}

/// Answers the first `healthy` queries, then fails every later one.
pub struct FailAfter<Q> {
  pub inner: Q,
  healthy: usize,
  calls: AtomicUsize,
}

impl<Q> FailAfter<Q> {
  pub fn new(inner: Q, healthy: usize) -> Self {
    Self {
      inner,
      healthy,
      calls: AtomicUsize::new(0),
    }
  }

  fn check(&self) -> Result<(), QueryError> {
    let n = self.calls.fetch_add(1, Ordering::SeqCst);
    if n >= self.healthy {
      Err(QueryError::unavailable(format!("injected failure on query {}", n + 1)))
    } else {
      Ok(())
    }
  }
}

impl<Q: SpatialQueryService> SpatialQueryService for FailAfter<Q> {
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError> {
    self.check()?;
    self.inner.closest_distance(shape, max_distance)
  }

  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError> {
    self.check()?;
    self.inner.overlap_aabb(aabb)
  }

  fn cast_ray(&self, start: Vec3, end: Vec3) -> Result<bool, QueryError> {
    self.check()?;
    self.inner.cast_ray(start, end)
  }
}
