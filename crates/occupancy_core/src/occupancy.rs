//! OccupancyGrid - one grid, its strategy and its published store.
//!
//! Each call to [`OccupancyGrid::update`] is one fork-join cycle:
//!
//! ```text
//!   Aggregator::new ──► classify (parallel, sinks) ──► join
//!                                                       │
//!                         Ok ──► commit ──► store (generation + 1)
//!                         Err ─► discard   (store untouched)
//! ```
//!
//! Multiple grids can exist independently (different planes, resolutions or
//! strategies over the same scene).

use std::sync::atomic::{AtomicU64, Ordering};

use web_time::Instant;

use crate::aggregate::Aggregator;
use crate::classify::{Classifier, ClassifyStats};
use crate::config::OccupancyConfig;
use crate::error::OccupancyError;
use crate::grid::GridSpec;
use crate::metrics::OccupancyMetrics;
use crate::query::SpatialQueryService;
use crate::store::{Generation, OccupancyStore};
use crate::types::CellCoord;

// =============================================================================
// GridId - unique identifier
// =============================================================================

static GRID_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque grid identifier, unique within the process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GridId(u64);

impl GridId {
  pub fn new() -> Self {
    Self(GRID_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for GridId {
  fn default() -> Self {
    Self::new()
  }
}

// =============================================================================
// CycleReport
// =============================================================================

/// Summary of one published cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleReport {
  /// Name of the strategy that ran.
  pub strategy: &'static str,
  /// Occupied cells now in the store.
  pub occupied: usize,
  pub stats: ClassifyStats,
  /// Wall time from cycle start to publish.
  pub elapsed_us: u64,
  /// Store generation after publishing.
  pub generation: Generation,
}

// =============================================================================
// OccupancyGrid
// =============================================================================

/// Grid geometry, classification strategy and published occupancy.
///
/// The store is only written by `update`, which needs `&mut self`; readers
/// borrowing the store or holding a snapshot never observe a partial cycle.
pub struct OccupancyGrid {
  id: GridId,
  spec: GridSpec,
  classifier: Box<dyn Classifier>,
  store: OccupancyStore,
  metrics: OccupancyMetrics,
}

impl OccupancyGrid {
  pub fn new(spec: GridSpec, classifier: Box<dyn Classifier>) -> Self {
    Self {
      id: GridId::new(),
      spec,
      classifier,
      store: OccupancyStore::new(),
      metrics: OccupancyMetrics::new(),
    }
  }

  /// Validate `config` and build its grid and strategy.
  pub fn from_config(config: &OccupancyConfig) -> Result<Self, OccupancyError> {
    config.validate()?;
    let spec = config.build_grid()?;
    Ok(Self::new(spec, config.classifier.build()))
  }

  pub fn id(&self) -> GridId {
    self.id
  }

  pub fn spec(&self) -> &GridSpec {
    &self.spec
  }

  pub fn strategy(&self) -> &'static str {
    self.classifier.name()
  }

  /// Swap the strategy. Takes effect on the next cycle; the store is kept.
  pub fn set_classifier(&mut self, classifier: Box<dyn Classifier>) {
    self.classifier = classifier;
  }

  pub fn store(&self) -> &OccupancyStore {
    &self.store
  }

  /// Occupied cells of the last published cycle.
  pub fn snapshot(&self) -> Vec<CellCoord> {
    self.store.snapshot()
  }

  pub fn generation(&self) -> Generation {
    self.store.generation()
  }

  pub fn metrics(&self) -> &OccupancyMetrics {
    &self.metrics
  }

  /// Run one full classification cycle against `query` and publish it.
  ///
  /// On a query failure nothing is published: the store keeps the previous
  /// cycle's cells and generation, and the error is returned.
  #[tracing::instrument(skip_all, name = "occupancy::update", fields(grid = self.id.raw()))]
  pub fn update(&mut self, query: &dyn SpatialQueryService) -> Result<CycleReport, OccupancyError> {
    let start = Instant::now();
    tracing::debug!(
      strategy = self.classifier.name(),
      cells = self.spec.total_cells(),
      "occupancy cycle start"
    );

    let aggregator = Aggregator::new();
    let result = self.classifier.classify(&self.spec, query, &aggregator.sink());

    match result {
      Ok(stats) => {
        let occupied = aggregator.commit(&mut self.store);
        let report = CycleReport {
          strategy: self.classifier.name(),
          occupied,
          stats,
          elapsed_us: start.elapsed().as_micros() as u64,
          generation: self.store.generation(),
        };
        self.metrics.record_cycle(&report);

        tracing::debug!(
          occupied,
          queries = stats.total_queries(),
          pruned = stats.pruned_rects,
          elapsed_us = report.elapsed_us,
          generation = report.generation.0,
          "occupancy cycle published"
        );
        Ok(report)
      }
      Err(err) => {
        let dropped = aggregator.discard();
        let elapsed_us = start.elapsed().as_micros() as u64;
        self.metrics.record_failure(elapsed_us);

        tracing::warn!(
          error = %err,
          dropped,
          generation = self.store.generation().0,
          "occupancy cycle aborted, keeping previous snapshot"
        );
        Err(err.into())
      }
    }
  }
}

impl std::fmt::Debug for OccupancyGrid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OccupancyGrid")
      .field("id", &self.id)
      .field("spec", &self.spec)
      .field("strategy", &self.classifier.name())
      .field("occupied", &self.store.len())
      .field("generation", &self.store.generation())
      .finish()
  }
}

#[cfg(test)]
#[path = "occupancy_test.rs"]
mod occupancy_test;
