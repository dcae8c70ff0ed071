//! Cross-strategy tests: both classifiers must agree on obstacles that sit
//! well inside their cells.

use std::collections::HashSet;

use super::*;
use crate::aggregate::Aggregator;
use crate::scene::BoxScene;
use crate::store::OccupancyStore;
use crate::test_utils::*;
use crate::types::CellCoord;

fn classify_into_store(
  classifier: &dyn Classifier,
  grid: &GridSpec,
  query: &dyn SpatialQueryService,
) -> OccupancyStore {
  let aggregator = Aggregator::new();
  classifier
    .classify(grid, query, &aggregator.sink())
    .expect("classification succeeds");
  let mut store = OccupancyStore::new();
  aggregator.commit(&mut store);
  store
}

fn both() -> [Box<dyn Classifier>; 2] {
  [
    Box::new(SubdivisionClassifier::default()),
    Box::new(RaycastSampler::default()),
  ]
}

// =============================================================================
// Strategy agreement
// =============================================================================

#[test]
fn test_empty_scene_is_empty_for_both() {
  let grid = grid_4x4();
  for classifier in both() {
    let store = classify_into_store(classifier.as_ref(), &grid, &BoxScene::new());
    assert!(store.is_empty(), "{}", classifier.name());
  }
}

/// Box centered at (0.5, -0.5, 0) sized 0.8 x 0.8 x 1 lands in cell (2, 1).
#[test]
fn test_obstacle_in_one_cell_for_both() {
  let grid = grid_4x4();
  let scene = scene_with_cells(&grid, &[CellCoord::new(2, 1)]);
  for classifier in both() {
    let store = classify_into_store(classifier.as_ref(), &grid, &scene);
    assert_eq!(store.cells(), &[CellCoord::new(2, 1)], "{}", classifier.name());
  }
}

#[test]
fn test_strategies_agree_on_interior_obstacles() {
  let grid = grid(16, 12);
  let targets: Vec<_> = (0..grid.total_cells())
    .filter(|i| (i * 7919) % 5 == 0)
    .map(|i| CellCoord::from_index(i, grid.width()))
    .collect();
  let scene = scene_with_cells(&grid, &targets);

  let [subdivision, raycast] = both();
  let a = classify_into_store(subdivision.as_ref(), &grid, &scene);
  let b = classify_into_store(raycast.as_ref(), &grid, &scene);

  assert!(a.same_cells(&b));
  assert_eq!(a.to_set(), targets.into_iter().collect::<HashSet<_>>());
}

/// Every cell in the result is reported once, even with many parallel workers.
#[test]
fn test_no_duplicates_under_full_cover() {
  let grid = grid(31, 29);
  let scene = full_cover_scene(&grid);
  for classifier in both() {
    let store = classify_into_store(classifier.as_ref(), &grid, &scene);
    assert_eq!(store.len(), grid.total_cells(), "{}", classifier.name());
    assert!(store.is_deduplicated());
  }
}

/// Repeated runs over an unchanged scene give the same set.
#[test]
fn test_repeated_runs_are_deterministic() {
  let grid = grid(10, 10);
  let scene = scene_with_cells(
    &grid,
    &[CellCoord::new(0, 9), CellCoord::new(5, 5), CellCoord::new(9, 0)],
  );
  for classifier in both() {
    let first = classify_into_store(classifier.as_ref(), &grid, &scene);
    for _ in 0..5 {
      let again = classify_into_store(classifier.as_ref(), &grid, &scene);
      assert!(first.same_cells(&again), "{}", classifier.name());
    }
  }
}

// =============================================================================
// Stats
// =============================================================================

#[test]
fn test_stats_accumulate() {
  let mut total = ClassifyStats {
    distance_queries: 3,
    cells_emitted: 1,
    ..ClassifyStats::default()
  };
  total += ClassifyStats {
    rays_cast: 4,
    overlap_queries: 2,
    cells_emitted: 2,
    ..ClassifyStats::default()
  };

  assert_eq!(total.total_queries(), 9);
  assert_eq!(total.cells_emitted, 3);
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_build_selects_strategy() {
  let config = ClassifierConfig::default();
  assert_eq!(config.build().name(), "subdivision");

  let config = ClassifierConfig {
    strategy: Strategy::Raycast,
    ..ClassifierConfig::default()
  };
  assert_eq!(config.build().name(), "raycast");
}

#[test]
fn test_classifier_config_from_toml() {
  let config: ClassifierConfig = toml::from_str(
    r#"
      strategy = "raycast"

      [raycast]
      batch_size = 128
    "#,
  )
  .unwrap();

  assert_eq!(config.strategy, Strategy::Raycast);
  assert_eq!(config.raycast.batch_size, 128);
  assert_eq!(config.raycast.ray_offset, RaycastConfig::DEFAULT_RAY_OFFSET);
  assert_eq!(config.subdivision, SubdivisionConfig::default());
}
