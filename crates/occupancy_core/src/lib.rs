//! occupancy_core - Engine independent occupancy grid classification
//!
//! This crate decides which cells of a fixed 2D grid, laid over a 3D scene,
//! are blocked by geometry. The scene is only reached through a
//! [`SpatialQueryService`], so the same classifiers run against a physics
//! engine, an in-process [`BoxScene`], or a test double.
//!
//! # Features
//!
//! - **Subdivision classifier**: quad-splits the grid and prunes empty
//!   rectangles with one distance query each, fanning out to rayon
//! - **Raycast sampler**: one vertical ray per cell, all cells in parallel
//! - **Aggregator**: lock-free collection of worker hits, published to the
//!   store in one step after the parallel pass joins
//! - **Metrics**: rolling cycle timings (`metrics` feature)
//!
//! # Example
//!
//! ```ignore
//! use occupancy_core::{BoxScene, OccupancyConfig, OccupancyGrid};
//!
//! let config = OccupancyConfig::from_toml_str(r#"
//!   [grid]
//!   cell_count = [64, 64]
//! "#)?;
//! let mut grid = OccupancyGrid::from_config(&config)?;
//!
//! let report = grid.update(&scene)?;
//! println!("{} occupied cells in {}us", report.occupied, report.elapsed_us);
//! ```

// Re-export so engine bridges convert through the same glam version
pub use glam;

pub mod bounds;
pub mod error;
pub mod types;

pub use bounds::{Aabb, QueryBox};
pub use error::{OccupancyError, QueryError};
pub use types::{CellCoord, CellRect};

// Grid geometry and configuration
pub mod config;
pub mod grid;
pub use config::{GridConfig, OccupancyConfig};
pub use grid::GridSpec;

// Scene access
pub mod query;
pub mod scene;
pub use query::{ColliderHandle, SpatialQueryService, SurfaceDistance};
pub use scene::{BoxScene, SceneBox, SceneFile};

// Classification strategies
pub mod classify;
pub use classify::{
  Classifier, ClassifierConfig, ClassifyStats, PruneQuery, RaycastConfig, RaycastSampler,
  Strategy, SubdivisionClassifier, SubdivisionConfig,
};

// Result collection and publishing
pub mod aggregate;
pub mod store;
pub use aggregate::{Aggregator, CellSink};
pub use store::{Generation, OccupancyStore};

// Cycle orchestration
pub mod occupancy;
pub use occupancy::{CycleReport, GridId, OccupancyGrid};

pub mod metrics;

#[cfg(test)]
pub mod test_utils;
