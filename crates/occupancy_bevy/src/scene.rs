//! AvianScene - read-only collider snapshot answering spatial queries.
//!
//! Built once per cycle from the ECS after the physics step, then shared by
//! every classification worker. Queries run straight against parry shapes,
//! so workers never touch the `World`.

use avian3d::parry::bounding_volume::{Aabb as ParryAabb, BoundingVolume};
use avian3d::parry::math::Isometry;
use avian3d::parry::na;
use avian3d::parry::query::{self, Ray, RayCast};
use avian3d::parry::shape::{Cuboid, HeightField, SharedShape};
use avian3d::prelude::*;
use bevy::prelude::*;
use occupancy_core::glam;
use occupancy_core::{
  Aabb, ColliderHandle, QueryBox, QueryError, SpatialQueryService, SurfaceDistance,
};

// =============================================================================
// Conversions
// =============================================================================

fn isometry(translation: [f32; 3], rotation: [f32; 4]) -> Isometry<f32> {
  let [x, y, z] = translation;
  let [qx, qy, qz, qw] = rotation;
  Isometry::from_parts(
    na::Translation3::new(x, y, z),
    na::UnitQuaternion::from_quaternion(na::Quaternion::new(qw, qx, qy, qz)),
  )
}

fn point(v: glam::Vec3) -> na::Point3<f32> {
  na::Point3::new(v.x, v.y, v.z)
}

fn parry_aabb(aabb: &Aabb) -> ParryAabb {
  ParryAabb::new(point(aabb.min), point(aabb.max))
}

// =============================================================================
// SceneCollider
// =============================================================================

/// One collider frozen at snapshot time.
#[derive(Clone)]
pub struct SceneCollider {
  pub entity: Entity,
  shape: SharedShape,
  isometry: Isometry<f32>,
}

impl SceneCollider {
  /// Snapshot a collider at its world-space pose. The shape keeps any scale
  /// already applied to the collider.
  pub fn new(entity: Entity, collider: &Collider, position: &Position, rotation: &Rotation) -> Self {
    Self {
      entity,
      shape: collider.shape_scaled().clone(),
      isometry: isometry(position.0.to_array(), rotation.0.to_array()),
    }
  }

  fn handle(&self) -> ColliderHandle {
    ColliderHandle(self.entity.to_bits())
  }

  fn aabb(&self) -> ParryAabb {
    self.shape.compute_aabb(&self.isometry)
  }

  /// Signed distance from the posed query cuboid, if within `prediction`.
  fn contact_distance(
    &self,
    pose: &Isometry<f32>,
    cuboid: &Cuboid,
    bounds: &ParryAabb,
    prediction: f32,
  ) -> Result<Option<f32>, QueryError> {
    match query::contact(pose, cuboid, &self.isometry, &*self.shape, prediction) {
      Ok(contact) => Ok(contact.map(|c| c.dist)),
      // parry has no cuboid-heightfield contact; measure its triangles instead
      Err(_) => match self.shape.as_heightfield() {
        Some(heightfield) => self.heightfield_distance(heightfield, pose, cuboid, bounds, prediction),
        None => Err(self.unsupported()),
      },
    }
  }

  fn heightfield_distance(
    &self,
    heightfield: &HeightField,
    pose: &Isometry<f32>,
    cuboid: &Cuboid,
    bounds: &ParryAabb,
    prediction: f32,
  ) -> Result<Option<f32>, QueryError> {
    let local_bounds = bounds.transform_by(&self.isometry.inverse());

    let mut closest: Option<f32> = None;
    for triangle in heightfield.triangles() {
      if !triangle.local_aabb().intersects(&local_bounds) {
        continue;
      }
      let contact = query::contact(pose, cuboid, &self.isometry, &triangle, prediction)
        .map_err(|_| self.unsupported())?;
      if let Some(contact) = contact {
        closest = Some(closest.map_or(contact.dist, |d| d.min(contact.dist)));
      }
    }
    Ok(closest)
  }

  fn unsupported(&self) -> QueryError {
    QueryError::unsupported(format!("{:?}", self.shape.shape_type()), "distance")
  }
}

// =============================================================================
// AvianScene
// =============================================================================

/// Spatial query service over a snapshot of avian colliders.
#[derive(Clone, Default)]
pub struct AvianScene {
  colliders: Vec<SceneCollider>,
  unavailable: Option<String>,
}

impl AvianScene {
  pub fn new(colliders: impl IntoIterator<Item = SceneCollider>) -> Self {
    Self {
      colliders: colliders.into_iter().collect(),
      unavailable: None,
    }
  }

  /// Scene that fails every query with `reason`.
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self {
      colliders: Vec::new(),
      unavailable: Some(reason.into()),
    }
  }

  pub fn len(&self) -> usize {
    self.colliders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.colliders.is_empty()
  }

  fn check_available(&self) -> Result<(), QueryError> {
    match &self.unavailable {
      Some(reason) => Err(QueryError::unavailable(reason.clone())),
      None => Ok(()),
    }
  }
}

impl SpatialQueryService for AvianScene {
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError> {
    self.check_available()?;

    let h = shape.half_extents;
    let cuboid = Cuboid::new(na::Vector3::new(h.x, h.y, h.z));
    let pose = isometry(shape.center.to_array(), shape.rotation.to_array());
    let bounds = shape.bounding_aabb().inflate(max_distance.max(0.0));
    let bounds = parry_aabb(&bounds);
    // Contacts are only reported up to the prediction distance
    let prediction = max_distance.max(0.0);

    let mut closest: Option<SurfaceDistance> = None;
    for collider in &self.colliders {
      if !collider.aabb().intersects(&bounds) {
        continue;
      }
      let Some(distance) = collider.contact_distance(&pose, &cuboid, &bounds, prediction)? else {
        continue;
      };
      if distance > max_distance {
        continue;
      }
      if closest.is_none_or(|c| distance < c.distance) {
        closest = Some(SurfaceDistance {
          collider: collider.handle(),
          distance,
        });
      }
    }

    Ok(closest)
  }

  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError> {
    self.check_available()?;

    let bounds = parry_aabb(aabb);
    Ok(
      self
        .colliders
        .iter()
        .filter(|c| c.aabb().intersects(&bounds))
        .map(SceneCollider::handle)
        .collect(),
    )
  }

  fn cast_ray(&self, start: glam::Vec3, end: glam::Vec3) -> Result<bool, QueryError> {
    self.check_available()?;

    let dir = end - start;
    let ray = Ray::new(point(start), na::Vector3::new(dir.x, dir.y, dir.z));
    // Unit time of impact spans exactly start..end
    Ok(
      self
        .colliders
        .iter()
        .any(|c| c.shape.intersects_ray(&c.isometry, &ray, 1.0)),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cuboid_at(bits: u64, center: Vec3, size: Vec3) -> SceneCollider {
    SceneCollider::new(
      Entity::from_bits(bits),
      &Collider::cuboid(size.x, size.y, size.z),
      &Position(center),
      &Rotation::default(),
    )
  }

  fn thin_box(center: glam::Vec3, half: glam::Vec3) -> QueryBox {
    QueryBox::axis_aligned(center, half)
  }

  #[test]
  fn test_penetration_is_negative_distance() {
    let scene = AvianScene::new([cuboid_at(
      (1u64 << 32) | 1,
      Vec3::ZERO,
      Vec3::new(0.8, 0.8, 1.0),
    )]);
    let qbox = thin_box(glam::Vec3::ZERO, glam::Vec3::new(0.5, 0.5, 0.005));

    let hit = scene.closest_distance(&qbox, -0.05).unwrap();

    let hit = hit.expect("box penetrates the obstacle");
    assert!(hit.distance < -0.05);
  }

  #[test]
  fn test_separated_box_is_pruned_by_negative_margin() {
    let scene = AvianScene::new([cuboid_at(
      (1u64 << 32) | 1,
      Vec3::new(3.0, 0.0, 0.0),
      Vec3::ONE,
    )]);
    let qbox = thin_box(glam::Vec3::ZERO, glam::Vec3::new(0.5, 0.5, 0.005));

    assert!(scene.closest_distance(&qbox, -0.05).unwrap().is_none());
    let near = scene.closest_distance(&qbox, 3.0).unwrap().unwrap();
    assert!((near.distance - 2.0).abs() < 1e-3);
  }

  #[test]
  fn test_overlap_and_ray() {
    let scene = AvianScene::new([cuboid_at(
      (1u64 << 32) | 7,
      Vec3::new(0.5, -0.5, 0.0),
      Vec3::new(0.8, 0.8, 1.0),
    )]);

    let hits = scene
      .overlap_aabb(&Aabb::new(
        glam::Vec3::new(0.0, -1.0, -1.0),
        glam::Vec3::new(1.0, 0.0, 1.0),
      ))
      .unwrap();
    assert_eq!(hits.len(), 1);

    let hit = scene
      .cast_ray(glam::Vec3::new(0.5, -0.5, 0.1), glam::Vec3::new(0.5, -0.5, -0.1))
      .unwrap();
    let miss = scene
      .cast_ray(glam::Vec3::new(1.5, -0.5, 0.1), glam::Vec3::new(1.5, -0.5, -0.1))
      .unwrap();
    assert!(hit);
    assert!(!miss);
  }

  #[test]
  fn test_rotated_collider() {
    // 2 x 0.2 bar turned 90 degrees about Z now spans Y instead of X
    let bar = SceneCollider::new(
      Entity::from_bits((1u64 << 32) | 3),
      &Collider::cuboid(2.0, 0.2, 1.0),
      &Position(Vec3::ZERO),
      &Rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
    );
    let scene = AvianScene::new([bar]);

    let along_y = scene
      .cast_ray(glam::Vec3::new(0.0, 0.9, 0.1), glam::Vec3::new(0.0, 0.9, -0.1))
      .unwrap();
    let along_x = scene
      .cast_ray(glam::Vec3::new(0.9, 0.0, 0.1), glam::Vec3::new(0.9, 0.0, -0.1))
      .unwrap();
    assert!(along_y);
    assert!(!along_x);
  }

  /// Flat 3x3 heightfield turned from the XZ plane into the grid plane.
  fn terrain(bits: u64, center: Vec3) -> SceneCollider {
    SceneCollider::new(
      Entity::from_bits(bits),
      &Collider::heightfield(vec![vec![0.0; 3]; 3], Vec3::new(3.0, 1.0, 3.0)),
      &Position(center),
      &Rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
    )
  }

  #[test]
  fn test_heightfield_is_seen_by_distance_queries() {
    let scene = AvianScene::new([terrain((1u64 << 32) | 9, Vec3::ZERO)]);
    let qbox = thin_box(glam::Vec3::ZERO, glam::Vec3::new(0.5, 0.5, 0.005));

    let hit = scene
      .closest_distance(&qbox, 10.0)
      .unwrap()
      .expect("query box lies on the terrain");
    assert!(hit.distance <= 1e-3);
    assert_eq!(hit.collider, ColliderHandle((1u64 << 32) | 9));

    // Same terrain, agreeing with the other query kinds
    assert_eq!(scene.overlap_aabb(&qbox.bounding_aabb()).unwrap().len(), 1);
    assert!(scene.cast_ray(glam::Vec3::Z * 0.1, glam::Vec3::NEG_Z * 0.1).unwrap());
  }

  #[test]
  fn test_heightfield_distance_above_terrain() {
    let scene = AvianScene::new([terrain((1u64 << 32) | 9, Vec3::ZERO)]);
    let above = thin_box(glam::Vec3::new(0.0, 0.0, 2.0), glam::Vec3::new(0.5, 0.5, 0.005));

    assert!(scene.closest_distance(&above, -0.05).unwrap().is_none());
    let near = scene.closest_distance(&above, 5.0).unwrap().unwrap();
    assert!((near.distance - 1.995).abs() < 1e-3);
  }

  #[test]
  fn test_unavailable_scene_fails() {
    let scene = AvianScene::unavailable("physics not running");
    let err = scene
      .cast_ray(glam::Vec3::Z, glam::Vec3::NEG_Z)
      .unwrap_err();
    assert_eq!(err, QueryError::unavailable("physics not running"));
  }
}
