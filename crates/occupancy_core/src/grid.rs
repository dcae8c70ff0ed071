//! GridSpec - immutable grid geometry and cell-to-world coordinate mapping.

use glam::{UVec2, Vec3};

use crate::bounds::{Aabb, QueryBox};
use crate::error::OccupancyError;
use crate::types::{CellCoord, CellRect};

/// Fixed 2D grid laid over the scene on the `z = origin_offset.z` plane.
///
/// Cell `(x, y)` covers `[x * size.x, (x + 1) * size.x] x [y * size.y, (y + 1) * size.y]`
/// shifted by `origin_offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
  cell_count: UVec2,
  cell_size: Vec3,
  origin_offset: Vec3,
}

impl GridSpec {
  /// Validate and build a grid centered on the world origin.
  ///
  /// The origin offset is `-(cell_count / 2) * cell_size` with integer division
  /// on the count, so odd grids sit half a cell off center.
  pub fn new(cell_count: UVec2, cell_size: Vec3) -> Result<Self, OccupancyError> {
    if cell_count.x == 0 || cell_count.y == 0 {
      return Err(OccupancyError::invalid(format!(
        "cell_count must be positive on both axes, got {cell_count}"
      )));
    }
    if !cell_size.is_finite() || cell_size.cmple(Vec3::ZERO).any() {
      return Err(OccupancyError::invalid(format!(
        "cell_size must be positive and finite on every axis, got {cell_size}"
      )));
    }
    if (cell_count.x as u64) * (cell_count.y as u64) > u32::MAX as u64 {
      return Err(OccupancyError::invalid(format!(
        "grid of {cell_count} cells is too large"
      )));
    }

    let half = cell_count / 2;
    let origin_offset = Vec3::new(
      -(half.x as f32) * cell_size.x,
      -(half.y as f32) * cell_size.y,
      0.0,
    );

    Ok(Self {
      cell_count,
      cell_size,
      origin_offset,
    })
  }

  #[inline]
  pub fn cell_count(&self) -> UVec2 {
    self.cell_count
  }

  #[inline]
  pub fn cell_size(&self) -> Vec3 {
    self.cell_size
  }

  #[inline]
  pub fn origin_offset(&self) -> Vec3 {
    self.origin_offset
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.cell_count.x
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.cell_count.y
  }

  #[inline]
  pub fn total_cells(&self) -> usize {
    self.cell_count.x as usize * self.cell_count.y as usize
  }

  /// Rectangle covering every cell of the grid.
  #[inline]
  pub fn full_rect(&self) -> CellRect {
    CellRect::full(self.cell_count.x, self.cell_count.y)
  }

  #[inline]
  pub fn contains(&self, cell: CellCoord) -> bool {
    cell.x < self.cell_count.x && cell.y < self.cell_count.y
  }

  /// Get world-space minimum corner of a cell (on the grid plane).
  #[inline]
  pub fn cell_min(&self, cell: CellCoord) -> Vec3 {
    self.origin_offset
      + Vec3::new(
        cell.x as f32 * self.cell_size.x,
        cell.y as f32 * self.cell_size.y,
        0.0,
      )
  }

  /// Get world-space center of a cell (on the grid plane).
  #[inline]
  pub fn cell_center(&self, cell: CellCoord) -> Vec3 {
    self.origin_offset
      + Vec3::new(
        (cell.x as f32 + 0.5) * self.cell_size.x,
        (cell.y as f32 + 0.5) * self.cell_size.y,
        0.0,
      )
  }

  /// World-space center of a cell rectangle (on the grid plane).
  pub fn rect_center(&self, rect: &CellRect) -> Vec3 {
    let x = rect.x_min as f32 + rect.x_count() as f32 * 0.5;
    let y = rect.y_min as f32 + rect.y_count() as f32 * 0.5;
    self.origin_offset + Vec3::new(x * self.cell_size.x, y * self.cell_size.y, 0.0)
  }

  /// World-space extents of a cell rectangle on the grid plane.
  pub fn rect_extents(&self, rect: &CellRect) -> (f32, f32) {
    (
      rect.x_count() as f32 * self.cell_size.x,
      rect.y_count() as f32 * self.cell_size.y,
    )
  }

  /// Thin box covering a rectangle, `thickness` tall, centered on the grid plane.
  pub fn rect_query_box(&self, rect: &CellRect, thickness: f32) -> QueryBox {
    let (w, h) = self.rect_extents(rect);
    QueryBox::axis_aligned(
      self.rect_center(rect),
      Vec3::new(w * 0.5, h * 0.5, thickness * 0.5),
    )
  }

  /// Slab covering a rectangle from `-cell_size.z` to `+cell_size.z` around the plane.
  pub fn rect_slab(&self, rect: &CellRect) -> Aabb {
    let min = self.origin_offset
      + Vec3::new(
        rect.x_min as f32 * self.cell_size.x,
        rect.y_min as f32 * self.cell_size.y,
        -self.cell_size.z,
      );
    let max = self.origin_offset
      + Vec3::new(
        (rect.x_max + 1) as f32 * self.cell_size.x,
        (rect.y_max + 1) as f32 * self.cell_size.y,
        self.cell_size.z,
      );
    Aabb::new(min, max)
  }

  /// Map a world position to the cell containing it, if inside the grid.
  pub fn world_to_cell(&self, pos: Vec3) -> Option<CellCoord> {
    let local = pos - self.origin_offset;
    let fx = (local.x / self.cell_size.x).floor();
    let fy = (local.y / self.cell_size.y).floor();
    if fx < 0.0 || fy < 0.0 {
      return None;
    }
    let cell = CellCoord::new(fx as u32, fy as u32);
    self.contains(cell).then_some(cell)
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
