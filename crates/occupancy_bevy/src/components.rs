//! Bevy components for occupancy classification.

use bevy::prelude::*;

/// Marker for colliders that never block grid cells.
///
/// Sensors are skipped automatically; use this for solid colliders that
/// should still be walkable on the grid (e.g. the agents themselves).
///
/// # Example
/// ```ignore
/// commands.spawn((
///     RigidBody::Kinematic,
///     Collider::capsule(0.3, 1.0),
///     OccupancyIgnore,
/// ));
/// ```
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct OccupancyIgnore;
