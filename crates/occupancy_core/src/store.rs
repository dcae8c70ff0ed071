//! Grid occupancy store - the published set of occupied cells.

use std::collections::HashSet;

use crate::types::CellCoord;

/// Generation counter for detecting a newly published cycle.
///
/// Bumped once per successful publish; a failed cycle leaves it unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
  pub fn new() -> Self {
    Self(0)
  }

  pub fn increment(&mut self) {
    self.0 += 1;
  }
}

/// Ordered sequence of occupied cell coordinates.
///
/// Order carries no meaning; two stores are equal when they hold the same set
/// of cells. Only the aggregator writes to a store, through `&mut`, so readers
/// holding `&OccupancyStore` or a snapshot never see a cycle half-written.
///
/// A hashed index mirrors `cells` so [`contains`](Self::contains) is O(1)
/// for per-cell lookups such as pathfinding.
#[derive(Clone, Debug, Default)]
pub struct OccupancyStore {
  cells: Vec<CellCoord>,
  index: HashSet<CellCoord>,
  generation: Generation,
}

impl OccupancyStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Remove every cell.
  pub fn clear(&mut self) {
    self.cells.clear();
    self.index.clear();
  }

  /// Append a cell. The caller guarantees it is not already present.
  pub fn add(&mut self, cell: CellCoord) {
    self.cells.push(cell);
    self.index.insert(cell);
  }

  /// Read-only copy of the occupied cells for consumers.
  pub fn snapshot(&self) -> Vec<CellCoord> {
    self.cells.clone()
  }

  /// Borrow the occupied cells in insertion order.
  pub fn cells(&self) -> &[CellCoord] {
    &self.cells
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn contains(&self, cell: CellCoord) -> bool {
    self.index.contains(&cell)
  }

  /// Generation of the last published cycle (0 before the first publish).
  pub fn generation(&self) -> Generation {
    self.generation
  }

  pub(crate) fn mark_published(&mut self) {
    self.generation.increment();
  }

  /// Occupied cells as a set.
  pub fn to_set(&self) -> HashSet<CellCoord> {
    self.index.clone()
  }

  /// Set equality of occupied cells, ignoring order and generation.
  pub fn same_cells(&self, other: &OccupancyStore) -> bool {
    self.len() == other.len() && self.to_set() == other.to_set()
  }

  /// True when no cell appears twice.
  pub fn is_deduplicated(&self) -> bool {
    self.index.len() == self.cells.len()
  }
}
