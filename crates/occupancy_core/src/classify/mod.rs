//! Occupancy classifiers.
//!
//! Two interchangeable strategies fill the same store:
//!
//! ```text
//!  Subdivision                           Raycast
//!  ┌───────────────┐                     ┌─┬─┬─┬─┐
//!  │  distance?    │──pruned             ├─┼─┼─┼─┤   one ray per cell,
//!  ├───────┬───────┤                     ├─┼─┼─┼─┤   every cell in parallel
//!  │ quad  │ quad  │──recurse            └─┴─┴─┴─┘
//!  └───────┴───────┘
//!        │                                    │
//!        └──────────► CellSink ◄──────────────┘
//!                        │
//!                    Aggregator ──► OccupancyStore
//! ```
//!
//! Neither strategy ever touches the store; both report occupied cells into a
//! [`CellSink`] and return once all of their parallel work has joined.

pub mod raycast;
pub mod subdivision;

use std::ops::AddAssign;

use serde::Deserialize;

use crate::aggregate::CellSink;
use crate::error::QueryError;
use crate::grid::GridSpec;
use crate::query::SpatialQueryService;

pub use raycast::{RaycastConfig, RaycastSampler};
pub use subdivision::{PruneQuery, SubdivisionClassifier, SubdivisionConfig};

/// Counters collected during one classification pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassifyStats {
  /// Rectangles (including single cells) examined by subdivision.
  pub visited_rects: usize,
  /// Rectangles discarded by the prune query.
  pub pruned_rects: usize,
  /// Leaf cells rejected by the confirming overlap test.
  pub rejected_leaves: usize,
  pub distance_queries: usize,
  pub overlap_queries: usize,
  pub rays_cast: usize,
  /// Occupied cells reported to the sink.
  pub cells_emitted: usize,
}

impl ClassifyStats {
  /// Total calls made into the spatial query service.
  #[inline]
  pub fn total_queries(&self) -> usize {
    self.distance_queries + self.overlap_queries + self.rays_cast
  }
}

impl AddAssign for ClassifyStats {
  fn add_assign(&mut self, rhs: Self) {
    self.visited_rects += rhs.visited_rects;
    self.pruned_rects += rhs.pruned_rects;
    self.rejected_leaves += rhs.rejected_leaves;
    self.distance_queries += rhs.distance_queries;
    self.overlap_queries += rhs.overlap_queries;
    self.rays_cast += rhs.rays_cast;
    self.cells_emitted += rhs.cells_emitted;
  }
}

/// A strategy that decides which cells of a grid are occupied.
///
/// `classify` must report every occupied cell exactly once to `sink` and must
/// not return until all work it spawned has finished.
pub trait Classifier: Send + Sync {
  /// Short name for logs and reports.
  fn name(&self) -> &'static str;

  fn classify(
    &self,
    grid: &GridSpec,
    query: &dyn SpatialQueryService,
    sink: &CellSink,
  ) -> Result<ClassifyStats, QueryError>;
}

/// Which strategy to run.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
  #[default]
  Subdivision,
  Raycast,
}

/// Strategy selection plus the tuning of both strategies.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
  pub strategy: Strategy,
  pub subdivision: SubdivisionConfig,
  pub raycast: RaycastConfig,
}

impl ClassifierConfig {
  /// Build the selected strategy.
  pub fn build(&self) -> Box<dyn Classifier> {
    match self.strategy {
      Strategy::Subdivision => Box::new(SubdivisionClassifier::new(self.subdivision.clone())),
      Strategy::Raycast => Box::new(RaycastSampler::new(self.raycast.clone())),
    }
  }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;
