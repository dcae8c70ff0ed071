//! Text output for classified grids.

use std::fmt::Write;

use occupancy_core::{CellCoord, GridSpec, OccupancyStore};

/// ASCII map, top row first so `+y` points up. `#` is occupied.
pub fn ascii_map(grid: &GridSpec, store: &OccupancyStore) -> String {
  let width = grid.width() as usize;
  let mut occupied = vec![false; grid.total_cells()];
  for cell in store.cells() {
    occupied[cell.to_index(grid.width())] = true;
  }

  let mut out = String::with_capacity((width + 1) * grid.height() as usize);
  for y in (0..grid.height()).rev() {
    for x in 0..grid.width() {
      let blocked = occupied[CellCoord::new(x, y).to_index(grid.width())];
      out.push(if blocked { '#' } else { '.' });
    }
    out.push('\n');
  }
  out
}

/// One `x y` pair per line, sorted row-major.
pub fn cell_list(store: &OccupancyStore) -> String {
  let mut cells = store.snapshot();
  cells.sort_by_key(|c| (c.y, c.x));

  let mut out = String::new();
  for cell in cells {
    let _ = writeln!(out, "{} {}", cell.x, cell.y);
  }
  out
}
