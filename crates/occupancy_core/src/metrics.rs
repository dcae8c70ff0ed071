//! Engine-agnostic metrics for occupancy cycles.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use occupancy_core::metrics::{OccupancyMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics (on by default)
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let report = grid.update(&scene)?;
//! println!("avg cycle: {:.1}us", grid.metrics().avg_cycle_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::occupancy::CycleReport;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window of recent values (e.g. cycle timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.capacity == 0 {
      return;
    }
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Oldest to newest.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  pub fn sum(&self) -> u64 {
    self.buffer.iter().sum()
  }

  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = self.buffer.iter().min()?;
    let max = self.buffer.iter().max()?;
    Some((*min, *max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128) // ~2 seconds of fixed-timestep cycles at 64Hz
  }
}

/// Per-grid statistics updated after each cycle.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMetrics {
  /// Cycle wall time in microseconds.
  pub cycle_timings: RollingWindow<u64>,
  /// Spatial queries issued per cycle.
  pub queries_per_cycle: RollingWindow<u64>,

  /// Occupied cells published by the last successful cycle.
  pub last_occupied: usize,
  pub last_cycle_us: u64,

  // Cumulative, survive `reset`
  pub cycles_published: u64,
  pub cycles_failed: u64,
}

impl OccupancyMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear the rolling windows and last-cycle snapshot.
  pub fn reset(&mut self) {
    self.cycle_timings.clear();
    self.queries_per_cycle.clear();
    self.last_occupied = 0;
    self.last_cycle_us = 0;
  }

  /// Record a cycle that published its result.
  pub fn record_cycle(&mut self, report: &CycleReport) {
    if !is_enabled() {
      return;
    }
    self.cycle_timings.push(report.elapsed_us);
    self.queries_per_cycle.push(report.stats.total_queries() as u64);
    self.last_occupied = report.occupied;
    self.last_cycle_us = report.elapsed_us;
    self.cycles_published += 1;
  }

  /// Record a cycle aborted by a query failure.
  pub fn record_failure(&mut self, elapsed_us: u64) {
    if !is_enabled() {
      return;
    }
    self.cycle_timings.push(elapsed_us);
    self.last_cycle_us = elapsed_us;
    self.cycles_failed += 1;
  }

  pub fn avg_cycle_us(&self) -> f64 {
    self.cycle_timings.average()
  }

  pub fn avg_queries_per_cycle(&self) -> f64 {
    self.queries_per_cycle.average()
  }
}
