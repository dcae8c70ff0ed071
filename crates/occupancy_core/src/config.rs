//! Configuration parsing for occupancy classification.
//!
//! ```toml
//! [grid]
//! cell_count = [64, 64]
//! cell_size = [1.0, 1.0, 1.0]
//!
//! [classifier]
//! strategy = "subdivision"
//!
//! [classifier.subdivision]
//! distance_margin = -0.05
//! ```
//!
//! Only `[grid]` is required; every classifier field has a default.

use std::path::Path;

use glam::{UVec2, Vec3};
use serde::Deserialize;

use crate::classify::ClassifierConfig;
use crate::error::OccupancyError;
use crate::grid::GridSpec;

/// Root configuration for one occupancy grid.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OccupancyConfig {
  pub grid: GridConfig,
  #[serde(default)]
  pub classifier: ClassifierConfig,
}

/// Grid dimensions as written in config files.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct GridConfig {
  /// Cells along X and Y.
  pub cell_count: [u32; 2],
  /// World size of one cell. `z` sets the slab half-height for overlap queries.
  #[serde(default = "default_cell_size")]
  pub cell_size: [f32; 3],
}

fn default_cell_size() -> [f32; 3] {
  [1.0, 1.0, 1.0]
}

impl GridConfig {
  pub fn cell_count(&self) -> UVec2 {
    UVec2::from_array(self.cell_count)
  }

  pub fn cell_size(&self) -> Vec3 {
    Vec3::from_array(self.cell_size)
  }
}

impl OccupancyConfig {
  pub fn new(cell_count: UVec2, cell_size: Vec3) -> Self {
    Self {
      grid: GridConfig {
        cell_count: cell_count.to_array(),
        cell_size: cell_size.to_array(),
      },
      classifier: ClassifierConfig::default(),
    }
  }

  /// Load and validate configuration from a TOML file.
  pub fn load(path: &Path) -> Result<Self, OccupancyError> {
    let content = std::fs::read_to_string(path).map_err(|source| OccupancyError::ConfigIo {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_toml_str(&content)?;

    tracing::info!(
      path = %path.display(),
      strategy = ?config.classifier.strategy,
      "loaded occupancy config"
    );
    Ok(config)
  }

  /// Parse and validate configuration from TOML text.
  pub fn from_toml_str(content: &str) -> Result<Self, OccupancyError> {
    let config: Self = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Check every value without building anything.
  pub fn validate(&self) -> Result<(), OccupancyError> {
    self.build_grid()?;
    self.classifier.subdivision.validate()?;
    self.classifier.raycast.validate()?;
    Ok(())
  }

  /// Grid geometry described by `[grid]`.
  pub fn build_grid(&self) -> Result<GridSpec, OccupancyError> {
    GridSpec::new(self.grid.cell_count(), self.grid.cell_size())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::classify::{PruneQuery, Strategy};

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = OccupancyConfig::from_toml_str(
      r#"
        [grid]
        cell_count = [8, 4]
      "#,
    )
    .unwrap();

    assert_eq!(config.grid.cell_count(), UVec2::new(8, 4));
    assert_eq!(config.grid.cell_size(), Vec3::ONE);
    assert_eq!(config.classifier, ClassifierConfig::default());
  }

  #[test]
  fn test_full_config() {
    let config = OccupancyConfig::from_toml_str(
      r#"
        [grid]
        cell_count = [64, 32]
        cell_size = [0.5, 0.5, 2.0]

        [classifier]
        strategy = "raycast"

        [classifier.subdivision]
        distance_margin = -0.1
        box_thickness = 0.02
        parallel_frontier = 4
        confirm_leaf_overlap = true
        prune_query = "overlap"

        [classifier.raycast]
        ray_offset = 0.25
        batch_size = 32
      "#,
    )
    .unwrap();

    let grid = config.build_grid().unwrap();
    assert_eq!(grid.total_cells(), 64 * 32);
    assert_eq!(config.classifier.strategy, Strategy::Raycast);
    assert_eq!(config.classifier.subdivision.prune_query, PruneQuery::Overlap);
    assert!(config.classifier.subdivision.confirm_leaf_overlap);
    assert_eq!(config.classifier.raycast.batch_size, 32);
  }

  #[test]
  fn test_zero_cell_count_is_rejected() {
    let err = OccupancyConfig::from_toml_str(
      r#"
        [grid]
        cell_count = [0, 4]
      "#,
    )
    .unwrap_err();

    assert!(matches!(err, OccupancyError::InvalidGridSpecification(_)));
  }

  #[test]
  fn test_bad_tuning_is_rejected() {
    let err = OccupancyConfig::from_toml_str(
      r#"
        [grid]
        cell_count = [4, 4]

        [classifier.raycast]
        batch_size = 0
      "#,
    )
    .unwrap_err();

    assert!(matches!(err, OccupancyError::InvalidGridSpecification(_)));
  }

  #[test]
  fn test_missing_grid_is_parse_error() {
    let err = OccupancyConfig::from_toml_str("[classifier]\nstrategy = \"raycast\"").unwrap_err();
    assert!(matches!(err, OccupancyError::ConfigParse(_)));
  }

  #[test]
  fn test_unknown_strategy_is_parse_error() {
    let err = OccupancyConfig::from_toml_str(
      r#"
        [grid]
        cell_count = [4, 4]

        [classifier]
        strategy = "voronoi"
      "#,
    )
    .unwrap_err();

    assert!(matches!(err, OccupancyError::ConfigParse(_)));
  }

  #[test]
  fn test_load_missing_file() {
    let err = OccupancyConfig::load(Path::new("/nonexistent/occupancy.toml")).unwrap_err();
    assert!(matches!(err, OccupancyError::ConfigIo { .. }));
  }
}
