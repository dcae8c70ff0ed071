//! Parallel raycast sampler.
//!
//! Every cell is tested on its own: one short vertical ray through the cell
//! center, from `+ray_offset` above the grid plane to `-ray_offset` below it.
//! Hits go straight into the cycle's [`CellSink`]; cells never depend on each
//! other, so the whole grid is one flat rayon iterator.

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec3;
use rayon::prelude::*;
use serde::Deserialize;

use super::{Classifier, ClassifyStats};
use crate::aggregate::CellSink;
use crate::error::{OccupancyError, QueryError};
use crate::grid::GridSpec;
use crate::query::SpatialQueryService;
use crate::types::CellCoord;

/// Tuning for [`RaycastSampler`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RaycastConfig {
  /// Distance above and below the grid plane where each ray starts and ends.
  pub ray_offset: f32,
  /// Minimum number of cells handled per rayon job. Affects speed only.
  pub batch_size: usize,
}

impl RaycastConfig {
  pub const DEFAULT_RAY_OFFSET: f32 = 0.1;
  pub const DEFAULT_BATCH_SIZE: usize = 64;

  pub fn validate(&self) -> Result<(), OccupancyError> {
    if !self.ray_offset.is_finite() || self.ray_offset <= 0.0 {
      return Err(OccupancyError::invalid(format!(
        "raycast ray_offset must be positive, got {}",
        self.ray_offset
      )));
    }
    if self.batch_size == 0 {
      return Err(OccupancyError::invalid("raycast batch_size must be at least 1"));
    }
    Ok(())
  }
}

impl Default for RaycastConfig {
  fn default() -> Self {
    Self {
      ray_offset: Self::DEFAULT_RAY_OFFSET,
      batch_size: Self::DEFAULT_BATCH_SIZE,
    }
  }
}

/// Brute-force per-cell raycast classifier.
#[derive(Clone, Debug, Default)]
pub struct RaycastSampler {
  config: RaycastConfig,
}

impl RaycastSampler {
  pub fn new(config: RaycastConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &RaycastConfig {
    &self.config
  }

  /// Ray endpoints for one cell.
  #[inline]
  pub fn ray_for(&self, grid: &GridSpec, cell: CellCoord) -> (Vec3, Vec3) {
    let center = grid.cell_center(cell);
    let offset = Vec3::new(0.0, 0.0, self.config.ray_offset);
    (center + offset, center - offset)
  }
}

impl Classifier for RaycastSampler {
  fn name(&self) -> &'static str {
    "raycast"
  }

  #[tracing::instrument(skip_all, name = "classify::raycast")]
  fn classify(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    sink: &CellSink,
  ) -> Result<ClassifyStats, QueryError> {
    let width = grid.width();
    let rays_cast = AtomicUsize::new(0);
    let hits = AtomicUsize::new(0);

    (0..grid.total_cells())
      .into_par_iter()
      .with_min_len(self.config.batch_size.max(1))
      .try_for_each_with(sink.clone(), |sink, index| {
        let cell = CellCoord::from_index(index, width);
        let (start, end) = self.ray_for(grid, cell);

        rays_cast.fetch_add(1, Ordering::Relaxed);
        if query.cast_ray(start, end)? {
          hits.fetch_add(1, Ordering::Relaxed);
          sink.push(cell);
        }
        Ok::<(), QueryError>(())
      })?;

    Ok(ClassifyStats {
      rays_cast: rays_cast.into_inner(),
      cells_emitted: hits.into_inner(),
      ..ClassifyStats::default()
    })
  }
}

#[cfg(test)]
#[path = "raycast_test.rs"]
mod raycast_test;
