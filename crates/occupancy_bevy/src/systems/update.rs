//! Per-tick classification cycle.

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::components::OccupancyIgnore;
use crate::resources::{OccupancyGridRes, OccupancySettings, OccupancyUpdated};
use crate::scene::{AvianScene, SceneCollider};

/// Colliders that can block cells.
pub type BlockingColliders<'w, 's> = Query<
  'w,
  's,
  (Entity, &'static Collider, &'static Position, &'static Rotation),
  (Without<OccupancyIgnore>, Without<Sensor>),
>;

/// Freeze the current collider poses into a query snapshot.
///
/// Without a physics clock the simulation has never been set up, so the
/// snapshot refuses queries instead of pretending the world is empty.
pub fn snapshot_scene(colliders: &BlockingColliders, physics_running: bool) -> AvianScene {
  if !physics_running {
    return AvianScene::unavailable("physics simulation is not running");
  }
  AvianScene::new(
    colliders
      .iter()
      .map(|(entity, collider, position, rotation)| {
        SceneCollider::new(entity, collider, position, rotation)
      }),
  )
}

/// Run one cycle against the post-step physics state.
///
/// The snapshot is built here on the main schedule; classification then runs
/// on rayon and joins before the system returns.
pub fn update_occupancy(
  settings: Res<OccupancySettings>,
  grid: Option<ResMut<OccupancyGridRes>>,
  physics_time: Option<Res<Time<Physics>>>,
  colliders: BlockingColliders,
  mut updated: EventWriter<OccupancyUpdated>,
) {
  if !settings.enabled {
    return;
  }
  let Some(mut grid) = grid else {
    return;
  };

  let scene = snapshot_scene(&colliders, physics_time.is_some());

  match grid.grid.update(&scene) {
    Ok(report) => {
      if grid.last_error.take().is_some() {
        info!("occupancy cycles recovered at generation {}", report.generation.0);
      }
      grid.last_report = Some(report);
      updated.write(OccupancyUpdated {
        generation: report.generation.0,
        occupied: report.occupied,
      });
    }
    Err(err) => {
      let message = err.to_string();
      // Only log when the failure changes, not every tick
      if grid.last_error.as_deref() != Some(message.as_str()) {
        warn!("occupancy cycle failed, keeping previous snapshot: {message}");
      }
      grid.last_error = Some(message);
    }
  }
}
