//! Offline occupancy classification.
//!
//! Loads a grid config and a scene of solid boxes, runs one cycle and prints
//! the occupied cells.
//!
//! ```text
//! occupancy --config demos/occupancy.toml --scene demos/scene.toml
//! occupancy -c demos/occupancy.toml -s demos/scene.toml --strategy raycast --format cells
//! occupancy -c demos/occupancy.toml -s demos/scene.toml --compare
//! ```

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use occupancy_core::{
  BoxScene, ClassifierConfig, OccupancyConfig, OccupancyGrid, SceneFile, Strategy,
};
use tracing_subscriber::EnvFilter;

/// Occupancy grid classifier for box scenes.
#[derive(Parser, Debug)]
#[command(name = "occupancy")]
#[command(about = "Classifies grid cells blocked by a TOML box scene")]
struct Args {
  /// Path to the occupancy configuration TOML file.
  #[arg(short, long)]
  config: PathBuf,

  /// Path to the scene TOML file (`[[boxes]]` with center and size).
  #[arg(short, long)]
  scene: PathBuf,

  /// Override the strategy from the config file.
  #[arg(long, value_enum)]
  strategy: Option<StrategyArg>,

  /// Output format.
  #[arg(short, long, value_enum, default_value_t = Format::Map)]
  format: Format,

  /// Run both strategies and list the cells where they disagree.
  #[arg(long)]
  compare: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
  Subdivision,
  Raycast,
}

impl From<StrategyArg> for Strategy {
  fn from(arg: StrategyArg) -> Self {
    match arg {
      StrategyArg::Subdivision => Strategy::Subdivision,
      StrategyArg::Raycast => Strategy::Raycast,
    }
  }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
  /// ASCII map, `#` for occupied cells.
  Map,
  /// One `x y` line per occupied cell.
  Cells,
  /// Counts and timings only.
  Summary,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let mut config = OccupancyConfig::load(&args.config)
    .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
  if let Some(strategy) = args.strategy {
    config.classifier.strategy = strategy.into();
  }

  let scene = load_scene(&args.scene)?;
  tracing::info!(boxes = scene.len(), "loaded scene");

  if args.compare {
    return compare(&config, &scene);
  }

  let mut grid = OccupancyGrid::from_config(&config)?;
  let report = grid.update(&scene).context("Classification cycle failed")?;

  match args.format {
    Format::Map => print!("{}", render::ascii_map(grid.spec(), grid.store())),
    Format::Cells => print!("{}", render::cell_list(grid.store())),
    Format::Summary => {}
  }

  eprintln!(
    "{}: {} of {} cells occupied, {} queries, {} pruned, {}us",
    report.strategy,
    report.occupied,
    grid.spec().total_cells(),
    report.stats.total_queries(),
    report.stats.pruned_rects,
    report.elapsed_us
  );

  Ok(())
}

fn load_scene(path: &Path) -> Result<BoxScene> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
  let file: SceneFile = toml::from_str(&content).with_context(|| "Failed to parse scene TOML")?;
  Ok(BoxScene::from_file(&file))
}

/// Classify with both strategies and print where they differ.
fn compare(config: &OccupancyConfig, scene: &BoxScene) -> Result<()> {
  let mut grids = Vec::new();
  for strategy in [Strategy::Subdivision, Strategy::Raycast] {
    let config = OccupancyConfig {
      classifier: ClassifierConfig {
        strategy,
        ..config.classifier.clone()
      },
      ..config.clone()
    };
    let mut grid = OccupancyGrid::from_config(&config)?;
    let report = grid.update(scene).context("Classification cycle failed")?;
    println!(
      "{:<12} {:>6} occupied {:>8} queries {:>8}us",
      report.strategy,
      report.occupied,
      report.stats.total_queries(),
      report.elapsed_us
    );
    grids.push(grid);
  }

  let subdivision = grids[0].store().to_set();
  let raycast = grids[1].store().to_set();
  let mut only_subdivision: Vec<_> = subdivision.difference(&raycast).copied().collect();
  let mut only_raycast: Vec<_> = raycast.difference(&subdivision).copied().collect();
  only_subdivision.sort_by_key(|c| (c.y, c.x));
  only_raycast.sort_by_key(|c| (c.y, c.x));

  if only_subdivision.is_empty() && only_raycast.is_empty() {
    println!("strategies agree");
    return Ok(());
  }
  for cell in only_subdivision {
    println!("subdivision only: {} {}", cell.x, cell.y);
  }
  for cell in only_raycast {
    println!("raycast only: {} {}", cell.x, cell.y);
  }
  Ok(())
}
