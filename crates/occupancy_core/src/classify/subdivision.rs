//! Recursive subdivision classifier.
//!
//! Quad-splits the grid rectangle and prunes any sub-rectangle whose thin
//! query box has no geometry within the distance margin. Surviving single
//! cells are occupied.
//!
//! # Work Scheduling
//!
//! Recursion runs on an explicit stack of pending rectangles:
//! 1. The root is expanded breadth-first on the calling thread until the
//!    frontier holds `parallel_frontier` rectangles (or runs out).
//! 2. Each frontier rectangle is then drained depth-first on its own rayon
//!    task. Frontier rectangles are disjoint, so tasks never report the same
//!    cell twice.
//!
//! # Precision
//!
//! Pruning is approximate at rectangle borders: a rectangle may survive while
//! all of its cells turn out free. There is no corrective second pass.

use rayon::prelude::*;
use serde::Deserialize;
use smallvec::SmallVec;

use super::{Classifier, ClassifyStats};
use crate::aggregate::CellSink;
use crate::error::{OccupancyError, QueryError};
use crate::grid::GridSpec;
use crate::query::SpatialQueryService;
use crate::types::{CellCoord, CellRect};

/// Query used to decide whether a rectangle can be pruned.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PruneQuery {
  /// Signed closest distance of a thin box against `distance_margin`.
  #[default]
  Distance,
  /// AABB overlap of the rectangle's slab (`z` in `[-cell_size.z, cell_size.z]`).
  Overlap,
}

/// Tuning for [`SubdivisionClassifier`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubdivisionConfig {
  pub prune_query: PruneQuery,
  /// Maximum signed distance that keeps a rectangle alive.
  /// Negative values demand penetration.
  pub distance_margin: f32,
  /// Height of the query box laid on the grid plane.
  pub box_thickness: f32,
  /// Re-check surviving leaf cells with an overlap query.
  pub confirm_leaf_overlap: bool,
  /// Frontier size to reach before fanning out to rayon. 0 or 1 runs the
  /// whole recursion on one task.
  pub parallel_frontier: usize,
}

impl SubdivisionConfig {
  pub const DEFAULT_DISTANCE_MARGIN: f32 = -0.05;
  pub const DEFAULT_BOX_THICKNESS: f32 = 0.01;
  pub const DEFAULT_PARALLEL_FRONTIER: usize = 16;

  pub fn validate(&self) -> Result<(), OccupancyError> {
    if !self.distance_margin.is_finite() {
      return Err(OccupancyError::invalid(format!(
        "subdivision distance_margin must be finite, got {}",
        self.distance_margin
      )));
    }
    if !self.box_thickness.is_finite() || self.box_thickness <= 0.0 {
      return Err(OccupancyError::invalid(format!(
        "subdivision box_thickness must be positive, got {}",
        self.box_thickness
      )));
    }
    Ok(())
  }

  /// Single-task recursion with default margins.
  pub fn sequential() -> Self {
    Self {
      parallel_frontier: 0,
      ..Self::default()
    }
  }
}

impl Default for SubdivisionConfig {
  fn default() -> Self {
    Self {
      prune_query: PruneQuery::Distance,
      distance_margin: Self::DEFAULT_DISTANCE_MARGIN,
      box_thickness: Self::DEFAULT_BOX_THICKNESS,
      confirm_leaf_overlap: false,
      parallel_frontier: Self::DEFAULT_PARALLEL_FRONTIER,
    }
  }
}

/// Outcome of examining one rectangle.
enum Visit {
  Pruned,
  Leaf(CellCoord),
  Split(SmallVec<[CellRect; 4]>),
}

/// Quad-subdivision classifier with early-exit pruning.
#[derive(Clone, Debug, Default)]
pub struct SubdivisionClassifier {
  config: SubdivisionConfig,
}

impl SubdivisionClassifier {
  pub fn new(config: SubdivisionConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SubdivisionConfig {
    &self.config
  }

  /// Run the prune query for one rectangle. `false` means provably free.
  fn survives(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    rect: &CellRect,
    stats: &mut ClassifyStats,
  ) -> Result<bool, QueryError> {
    match self.config.prune_query {
      PruneQuery::Distance => {
        stats.distance_queries += 1;
        let shape = grid.rect_query_box(rect, self.config.box_thickness);
        Ok(
          query
            .closest_distance(&shape, self.config.distance_margin)?
            .is_some(),
        )
      }
      PruneQuery::Overlap => {
        stats.overlap_queries += 1;
        Ok(!query.overlap_aabb(&grid.rect_slab(rect))?.is_empty())
      }
    }
  }

  fn visit(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    rect: CellRect,
    stats: &mut ClassifyStats,
  ) -> Result<Visit, QueryError> {
    stats.visited_rects += 1;

    if !self.survives(grid, query, &rect, stats)? {
      stats.pruned_rects += 1;
      return Ok(Visit::Pruned);
    }

    if rect.is_cell() {
      let confirm =
        self.config.confirm_leaf_overlap && self.config.prune_query != PruneQuery::Overlap;
      if confirm {
        stats.overlap_queries += 1;
        if query.overlap_aabb(&grid.rect_slab(&rect))?.is_empty() {
          stats.rejected_leaves += 1;
          return Ok(Visit::Pruned);
        }
      }
      stats.cells_emitted += 1;
      return Ok(Visit::Leaf(CellCoord::new(rect.x_min, rect.y_min)));
    }

    Ok(Visit::Split(rect.split()))
  }

  /// Depth-first drain of one rectangle on the current task.
  fn drain(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    root: CellRect,
    sink: &CellSink,
  ) -> Result<ClassifyStats, QueryError> {
    let mut stats = ClassifyStats::default();
    let mut stack = vec![root];

    while let Some(rect) = stack.pop() {
      match self.visit(grid, query, rect, &mut stats)? {
        Visit::Pruned => {}
        Visit::Leaf(cell) => sink.push(cell),
        // Reversed so the low half is popped first
        Visit::Split(children) => stack.extend(children.into_iter().rev()),
      }
    }

    Ok(stats)
  }

  /// Breadth-first expansion of the root until the frontier is wide enough to
  /// share across workers.
  fn expand_frontier(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    sink: &CellSink,
    stats: &mut ClassifyStats,
  ) -> Result<Vec<CellRect>, QueryError> {
    let target = self.config.parallel_frontier.max(1);
    let mut frontier = vec![grid.full_rect()];

    while !frontier.is_empty() && frontier.len() < target {
      let mut next = Vec::with_capacity(frontier.len() * 4);
      for rect in frontier {
        match self.visit(grid, query, rect, stats)? {
          Visit::Pruned => {}
          Visit::Leaf(cell) => sink.push(cell),
          Visit::Split(children) => next.extend(children),
        }
      }
      frontier = next;
    }

    Ok(frontier)
  }
}

impl Classifier for SubdivisionClassifier {
  fn name(&self) -> &'static str {
    "subdivision"
  }

  #[tracing::instrument(skip_all, name = "classify::subdivision")]
  fn classify(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    sink: &CellSink,
  ) -> Result<ClassifyStats, QueryError> {
    let mut stats = ClassifyStats::default();

    let frontier = {
      let _span = tracing::debug_span!("expand_frontier").entered();
      self.expand_frontier(grid, query, sink, &mut stats)?
    };

    tracing::trace!(frontier = frontier.len(), "fanning out subdivision");

    let per_task = frontier
      .into_par_iter()
      .map(|rect| self.drain(grid, query, rect, sink))
      .collect::<Result<Vec<_>, _>>()?;

    for task_stats in per_task {
      stats += task_stats;
    }

    Ok(stats)
  }
}

#[cfg(test)]
#[path = "subdivision_test.rs"]
mod subdivision_test;
