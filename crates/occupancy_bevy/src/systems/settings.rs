//! Grid (re)construction from settings.

use bevy::prelude::*;
use occupancy_core::OccupancyGrid;

use crate::resources::{OccupancyGridRes, OccupancySettings};

/// Build the grid from [`OccupancySettings`].
///
/// Runs whenever the settings change. Invalid settings remove the grid
/// resource so no cycle runs until they are fixed.
pub fn apply_occupancy_settings(mut commands: Commands, settings: Res<OccupancySettings>) {
  match OccupancyGrid::from_config(&settings.config) {
    Ok(grid) => {
      info!(
        "occupancy grid {}x{} using {}",
        grid.spec().width(),
        grid.spec().height(),
        grid.strategy()
      );
      commands.insert_resource(OccupancyGridRes::new(grid));
    }
    Err(err) => {
      error!("invalid occupancy settings: {err}");
      commands.remove_resource::<OccupancyGridRes>();
    }
  }
}
