//! Simple box scene for testing and offline classification.
//!
//! [`BoxScene`] answers spatial queries against a list of solid axis-aligned
//! boxes with exact box-box math. Use it to check classifier output against
//! hand-placed obstacles without a physics engine.

use glam::Vec3;
use serde::Deserialize;

use crate::bounds::{Aabb, QueryBox};
use crate::error::QueryError;
use crate::query::{ColliderHandle, SpatialQueryService, SurfaceDistance};

/// One solid box as written in scene files.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct SceneBox {
  /// Box center in world space.
  pub center: [f32; 3],
  /// Full box size on each axis.
  pub size: [f32; 3],
}

impl SceneBox {
  pub fn aabb(&self) -> Aabb {
    Aabb::from_center_half_extents(Vec3::from_array(self.center), Vec3::from_array(self.size) * 0.5)
  }
}

/// Scene description loaded from TOML (`[[boxes]]` tables).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneFile {
  #[serde(default)]
  pub boxes: Vec<SceneBox>,
}

/// Spatial query service over solid axis-aligned boxes.
///
/// Collider handles are the insertion index of each box.
#[derive(Clone, Debug)]
pub struct BoxScene {
  boxes: Vec<Aabb>,
  available: bool,
}

impl Default for BoxScene {
  fn default() -> Self {
    Self::new()
  }
}

impl BoxScene {
  /// Empty, available scene.
  pub fn new() -> Self {
    Self {
      boxes: Vec::new(),
      available: true,
    }
  }

  /// Scene that rejects every query, like a physics world that is not built yet.
  pub fn unavailable() -> Self {
    Self {
      boxes: Vec::new(),
      available: false,
    }
  }

  pub fn from_boxes(boxes: impl IntoIterator<Item = Aabb>) -> Self {
    Self {
      boxes: boxes.into_iter().collect(),
      available: true,
    }
  }

  pub fn from_file(file: &SceneFile) -> Self {
    Self::from_boxes(file.boxes.iter().map(SceneBox::aabb))
  }

  pub fn with_box(mut self, aabb: Aabb) -> Self {
    self.boxes.push(aabb);
    self
  }

  pub fn push(&mut self, aabb: Aabb) -> ColliderHandle {
    self.boxes.push(aabb);
    ColliderHandle(self.boxes.len() as u64 - 1)
  }

  pub fn len(&self) -> usize {
    self.boxes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.boxes.is_empty()
  }

  fn check_available(&self) -> Result<(), QueryError> {
    if self.available {
      Ok(())
    } else {
      Err(QueryError::unavailable("box scene is not available"))
    }
  }

  fn handles(&self) -> impl Iterator<Item = (ColliderHandle, &Aabb)> {
    self
      .boxes
      .iter()
      .enumerate()
      .map(|(i, aabb)| (ColliderHandle(i as u64), aabb))
  }
}

impl SpatialQueryService for BoxScene {
  fn closest_distance(
    &self,
    shape: &QueryBox,
    max_distance: f32,
  ) -> Result<Option<SurfaceDistance>, QueryError> {
    self.check_available()?;

    let query = shape.bounding_aabb();
    let closest = self
      .handles()
      .map(|(collider, aabb)| SurfaceDistance {
        collider,
        distance: query.signed_distance(aabb),
      })
      .filter(|hit| hit.distance <= max_distance)
      .min_by(|a, b| a.distance.total_cmp(&b.distance));

    Ok(closest)
  }

  fn overlap_aabb(&self, aabb: &Aabb) -> Result<Vec<ColliderHandle>, QueryError> {
    self.check_available()?;

    Ok(
      self
        .handles()
        .filter(|(_, b)| b.overlaps(aabb))
        .map(|(handle, _)| handle)
        .collect(),
    )
  }

  fn cast_ray(&self, start: Vec3, end: Vec3) -> Result<bool, QueryError> {
    self.check_available()?;

    Ok(self.boxes.iter().any(|b| b.segment_entry(start, end).is_some()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit_box_at(center: Vec3) -> Aabb {
    Aabb::from_center_half_extents(center, Vec3::splat(0.5))
  }

  #[test]
  fn test_empty_scene_answers_nothing() {
    let scene = BoxScene::new();
    let qbox = QueryBox::axis_aligned(Vec3::ZERO, Vec3::splat(10.0));

    assert!(scene.closest_distance(&qbox, 1.0).unwrap().is_none());
    assert!(scene.overlap_aabb(&qbox.bounding_aabb()).unwrap().is_empty());
    assert!(!scene.cast_ray(Vec3::Z, -Vec3::Z).unwrap());
  }

  #[test]
  fn test_unavailable_scene_fails_every_query() {
    let scene = BoxScene::unavailable();
    let qbox = QueryBox::axis_aligned(Vec3::ZERO, Vec3::ONE);

    assert!(scene.closest_distance(&qbox, 0.0).is_err());
    assert!(scene.overlap_aabb(&qbox.bounding_aabb()).is_err());
    assert!(scene.cast_ray(Vec3::Z, -Vec3::Z).is_err());
  }

  #[test]
  fn test_closest_distance_picks_nearest_within_margin() {
    let scene = BoxScene::new()
      .with_box(unit_box_at(Vec3::new(5.0, 0.0, 0.0)))
      .with_box(unit_box_at(Vec3::new(2.0, 0.0, 0.0)));
    let qbox = QueryBox::axis_aligned(Vec3::ZERO, Vec3::splat(0.5));

    let hit = scene.closest_distance(&qbox, 10.0).unwrap().unwrap();
    assert_eq!(hit.collider, ColliderHandle(1));
    assert!((hit.distance - 1.0).abs() < 1e-6);

    assert!(scene.closest_distance(&qbox, 0.5).unwrap().is_none());
  }

  /// A negative margin requires actual penetration of at least that depth.
  #[test]
  fn test_negative_margin_requires_penetration() {
    let scene = BoxScene::new().with_box(unit_box_at(Vec3::ZERO));

    let touching = QueryBox::axis_aligned(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.005));
    assert!(scene.closest_distance(&touching, -0.05).unwrap().is_none());

    let inside = QueryBox::axis_aligned(Vec3::new(0.9, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.005));
    assert!(scene.closest_distance(&inside, -0.05).unwrap().is_some());
  }

  #[test]
  fn test_ray_hits_box_under_segment() {
    let scene = BoxScene::new().with_box(unit_box_at(Vec3::ZERO));
    assert!(scene
      .cast_ray(Vec3::new(0.2, 0.2, 0.1), Vec3::new(0.2, 0.2, -0.1))
      .unwrap());
    assert!(!scene
      .cast_ray(Vec3::new(1.2, 0.2, 0.1), Vec3::new(1.2, 0.2, -0.1))
      .unwrap());
  }

  #[test]
  fn test_scene_file_parses_boxes() {
    let file: SceneFile = toml::from_str(
      r#"
        [[boxes]]
        center = [0.5, -0.5, 0.0]
        size = [0.8, 0.8, 1.0]
      "#,
    )
    .unwrap();
    let scene = BoxScene::from_file(&file);
    assert_eq!(scene.len(), 1);
    assert!(scene
      .cast_ray(Vec3::new(0.5, -0.5, 0.1), Vec3::new(0.5, -0.5, -0.1))
      .unwrap());
  }
}
