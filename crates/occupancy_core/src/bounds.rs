//! Query shapes: axis-aligned boxes and oriented query boxes.

use glam::{Quat, Vec3};

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  /// Minimum corner (inclusive).
  pub min: Vec3,
  /// Maximum corner (inclusive).
  pub max: Vec3,
}

impl Aabb {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create a new AABB from center and half-extents.
  pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      min: center - half_extents,
      max: center + half_extents,
    }
  }

  /// Check if this AABB overlaps with another.
  ///
  /// Touching boundaries count as overlapping.
  #[inline]
  pub fn overlaps(&self, other: &Aabb) -> bool {
    self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
  }

  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }

  /// Grow (positive) or shrink (negative) every face by `amount`.
  ///
  /// Shrinking never inverts the box; it collapses to the center instead.
  pub fn inflate(&self, amount: f32) -> Self {
    let center = self.center();
    let half = (self.size() * 0.5 + Vec3::splat(amount)).max(Vec3::ZERO);
    Self::from_center_half_extents(center, half)
  }

  /// Signed distance between two boxes.
  ///
  /// Positive: length of the gap separating them. Zero: touching.
  /// Negative: overlapping, magnitude is the penetration depth along the
  /// axis of least overlap.
  pub fn signed_distance(&self, other: &Aabb) -> f32 {
    let gap = (other.min - self.max).max(self.min - other.max);
    if gap.cmple(Vec3::ZERO).all() {
      gap.max_element()
    } else {
      gap.max(Vec3::ZERO).length()
    }
  }

  /// Parametric entry point of the segment `start + t * (end - start)`,
  /// `t` in `[0, 1]`, or `None` when the segment misses the box.
  pub fn segment_entry(&self, start: Vec3, end: Vec3) -> Option<f32> {
    let dir = end - start;
    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;

    for axis in 0..3 {
      let (s, d, lo, hi) = (start[axis], dir[axis], self.min[axis], self.max[axis]);
      if d.abs() <= f32::EPSILON {
        if s < lo || s > hi {
          return None;
        }
        continue;
      }
      let inv = 1.0 / d;
      let (mut t0, mut t1) = ((lo - s) * inv, (hi - s) * inv);
      if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
      }
      t_min = t_min.max(t0);
      t_max = t_max.min(t1);
      if t_min > t_max {
        return None;
      }
    }

    Some(t_min)
  }
}

/// Oriented box used as a temporary query collider.
///
/// Built per query and passed by reference; it never outlives the call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryBox {
  pub center: Vec3,
  pub half_extents: Vec3,
  pub rotation: Quat,
}

impl QueryBox {
  /// Axis-aligned query box (identity rotation).
  pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
    Self {
      center,
      half_extents,
      rotation: Quat::IDENTITY,
    }
  }

  /// Tight world-space AABB enclosing the rotated box.
  pub fn bounding_aabb(&self) -> Aabb {
    let axes = [
      self.rotation * Vec3::X * self.half_extents.x,
      self.rotation * Vec3::Y * self.half_extents.y,
      self.rotation * Vec3::Z * self.half_extents.z,
    ];
    let reach = axes[0].abs() + axes[1].abs() + axes[2].abs();
    Aabb::from_center_half_extents(self.center, reach)
  }
}
