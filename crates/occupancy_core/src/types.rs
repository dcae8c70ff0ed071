//! Core grid value types: cell coordinates and inclusive cell rectangles.

use smallvec::SmallVec;

// =============================================================================
// CellCoord
// =============================================================================

/// Integer coordinate of one grid cell.
///
/// Valid coordinates satisfy `0 <= x < cell_count.x` and `0 <= y < cell_count.y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
  pub x: u32,
  pub y: u32,
}

impl CellCoord {
  #[inline]
  pub const fn new(x: u32, y: u32) -> Self {
    Self { x, y }
  }

  /// Row-major coordinate for a flat cell index (`x` fastest).
  #[inline]
  pub fn from_index(index: usize, width: u32) -> Self {
    let width = width as usize;
    Self::new((index % width) as u32, (index / width) as u32)
  }

  /// Row-major flat index of this cell.
  #[inline]
  pub fn to_index(self, width: u32) -> usize {
    self.y as usize * width as usize + self.x as usize
  }
}

impl From<(u32, u32)> for CellCoord {
  fn from((x, y): (u32, u32)) -> Self {
    Self::new(x, y)
  }
}

// =============================================================================
// CellRect
// =============================================================================

/// Inclusive rectangle of cells, the unit of subdivision.
///
/// Invariant: `x_min <= x_max` and `y_min <= y_max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRect {
  pub x_min: u32,
  pub x_max: u32,
  pub y_min: u32,
  pub y_max: u32,
}

impl CellRect {
  /// Create a rectangle from inclusive bounds.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on both axes.
  pub fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
    debug_assert!(
      x_min <= x_max && y_min <= y_max,
      "CellRect min must be <= max on both axes"
    );
    Self {
      x_min,
      x_max,
      y_min,
      y_max,
    }
  }

  /// Rectangle covering a whole `width` x `height` grid.
  pub fn full(width: u32, height: u32) -> Self {
    Self::new(0, width - 1, 0, height - 1)
  }

  #[inline]
  pub fn x_count(&self) -> u32 {
    self.x_max - self.x_min + 1
  }

  #[inline]
  pub fn y_count(&self) -> u32 {
    self.y_max - self.y_min + 1
  }

  #[inline]
  pub fn area(&self) -> u64 {
    self.x_count() as u64 * self.y_count() as u64
  }

  #[inline]
  pub fn is_cell(&self) -> bool {
    self.x_min == self.x_max && self.y_min == self.y_max
  }

  #[inline]
  pub fn contains(&self, cell: CellCoord) -> bool {
    cell.x >= self.x_min && cell.x <= self.x_max && cell.y >= self.y_min && cell.y <= self.y_max
  }

  /// Iterate all cells in row-major order.
  pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
    (self.y_min..=self.y_max)
      .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| CellCoord::new(x, y)))
  }

  /// Split into 2 or 4 disjoint children.
  ///
  /// Each axis with more than one cell is cut after its first `count - count / 2`
  /// cells, so odd counts put the larger half first. Axes with a single cell are
  /// left whole. Children come back low-half first; for a 4-way split the order
  /// is (low, low), (high, low), (low, high), (high, high).
  ///
  /// A single cell has no children.
  pub fn split(&self) -> SmallVec<[CellRect; 4]> {
    let mut out = SmallVec::new();
    if self.is_cell() {
      return out;
    }

    let x_halves = Self::halves(self.x_min, self.x_max);
    let y_halves = Self::halves(self.y_min, self.y_max);

    for &(y_lo, y_hi) in &y_halves {
      for &(x_lo, x_hi) in &x_halves {
        out.push(CellRect::new(x_lo, x_hi, y_lo, y_hi));
      }
    }
    out
  }

  /// Inclusive halves of `[min, max]`, larger half first.
  fn halves(min: u32, max: u32) -> SmallVec<[(u32, u32); 2]> {
    let count = max - min + 1;
    let ext = count / 2;
    let mut out = SmallVec::new();
    if ext == 0 {
      out.push((min, max));
    } else {
      out.push((min, max - ext));
      out.push((max - ext + 1, max));
    }
    out
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
