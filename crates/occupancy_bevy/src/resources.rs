//! Bevy resources for occupancy classification.

use bevy::prelude::*;
use occupancy_core::glam::UVec2 as CoreUVec2;
use occupancy_core::glam::Vec3 as CoreVec3;
use occupancy_core::{CellCoord, CycleReport, OccupancyConfig, OccupancyGrid};

/// User-facing settings. Changing this resource rebuilds the grid.
#[derive(Resource, Clone, Debug)]
pub struct OccupancySettings {
  pub config: OccupancyConfig,
  /// Run a cycle every fixed tick while true.
  pub enabled: bool,
}

impl OccupancySettings {
  pub fn new(config: OccupancyConfig) -> Self {
    Self {
      config,
      enabled: true,
    }
  }
}

impl Default for OccupancySettings {
  fn default() -> Self {
    Self::new(OccupancyConfig::new(
      CoreUVec2::new(64, 64),
      CoreVec3::ONE,
    ))
  }
}

/// The live grid plus the outcome of its latest cycle.
///
/// Absent while the settings are invalid.
#[derive(Resource, Debug)]
pub struct OccupancyGridRes {
  pub grid: OccupancyGrid,
  /// Report of the last published cycle.
  pub last_report: Option<CycleReport>,
  /// Error of the last cycle, cleared by the next successful one.
  pub last_error: Option<String>,
}

impl OccupancyGridRes {
  pub fn new(grid: OccupancyGrid) -> Self {
    Self {
      grid,
      last_report: None,
      last_error: None,
    }
  }

  /// Occupied cells of the last published cycle.
  pub fn cells(&self) -> &[CellCoord] {
    self.grid.store().cells()
  }

  /// Constant-time lookup against the published store.
  pub fn is_occupied(&self, cell: CellCoord) -> bool {
    self.grid.store().contains(cell)
  }

  /// Cell under a world position, if inside the grid.
  pub fn cell_at(&self, world_pos: Vec3) -> Option<CellCoord> {
    self
      .grid
      .spec()
      .world_to_cell(CoreVec3::from_array(world_pos.to_array()))
  }
}

/// Sent after every published cycle.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OccupancyUpdated {
  pub generation: u64,
  pub occupied: usize,
}
