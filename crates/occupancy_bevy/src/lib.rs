//! Bevy + avian3d bridge for occupancy_core.
//!
//! Snapshots avian colliders after every physics step and keeps an
//! [`OccupancyGridRes`] up to date with the cells they block.
//!
//! ```text
//!  FixedPostUpdate
//!  ┌──────────────────────┐   ┌──────────────────────────┐
//!  │ PhysicsSet::Step...  │──►│ OccupancySet             │
//!  └──────────────────────┘   │  apply_occupancy_settings│ (on change)
//!                             │  update_occupancy        │──► OccupancyUpdated
//!                             └──────────────────────────┘
//! ```

pub mod components;
pub mod resources;
pub mod scene;
pub mod systems;

use avian3d::prelude::PhysicsSet;
use bevy::prelude::*;
pub use components::*;
use occupancy_core::OccupancyConfig;
pub use resources::*;
pub use scene::{AvianScene, SceneCollider};

/// Systems that rebuild and update the occupancy grid.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccupancySet;

/// Bevy plugin for occupancy classification over avian colliders.
///
/// Add after `PhysicsPlugins`.
#[derive(Default)]
pub struct OccupancyPlugin {
  pub settings: OccupancySettings,
}

impl OccupancyPlugin {
  pub fn new(config: OccupancyConfig) -> Self {
    Self {
      settings: OccupancySettings::new(config),
    }
  }
}

impl Plugin for OccupancyPlugin {
  fn build(&self, app: &mut App) {
    app
      .insert_resource(self.settings.clone())
      .add_event::<OccupancyUpdated>()
      .configure_sets(
        FixedPostUpdate,
        OccupancySet.after(PhysicsSet::StepSimulation),
      )
      .add_systems(
        FixedPostUpdate,
        (
          systems::apply_occupancy_settings.run_if(resource_changed::<OccupancySettings>),
          systems::update_occupancy,
        )
          .chain()
          .in_set(OccupancySet),
      );
  }
}
