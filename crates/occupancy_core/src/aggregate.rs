//! Aggregator - the single writer between parallel workers and the store.
//!
//! Following the producer/drain pattern: Sink → Join → Commit
//!
//! Workers hold cloned [`CellSink`]s and push hits into an unbounded
//! multi-producer channel. The aggregator itself is only committed after the
//! parallel call that used the sinks has returned, so every send of the cycle
//! happens-before the drain.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::store::OccupancyStore;
use crate::types::CellCoord;

/// Producer handle given to classification workers.
#[derive(Clone)]
pub struct CellSink {
  sender: Sender<CellCoord>,
}

impl CellSink {
  /// Report an occupied cell.
  #[inline]
  pub fn push(&self, cell: CellCoord) {
    // The receiver lives in the Aggregator, which outlives every sink of the
    // cycle, so the send cannot fail.
    let _ = self.sender.send(cell);
  }
}

/// Per-cycle concurrent result queue.
pub struct Aggregator {
  sender: Sender<CellCoord>,
  receiver: Receiver<CellCoord>,
}

impl Default for Aggregator {
  fn default() -> Self {
    Self::new()
  }
}

impl Aggregator {
  pub fn new() -> Self {
    let (sender, receiver) = unbounded();
    Self { sender, receiver }
  }

  /// New producer handle for this cycle.
  pub fn sink(&self) -> CellSink {
    CellSink {
      sender: self.sender.clone(),
    }
  }

  /// Number of cells queued so far.
  pub fn pending_count(&self) -> usize {
    self.receiver.len()
  }

  /// Drain every queued cell into `store`, replacing its previous contents.
  ///
  /// Consumes the aggregator; call only after all workers of the cycle have
  /// joined. Returns the number of cells published.
  pub fn commit(self, store: &mut OccupancyStore) -> usize {
    let Self { sender, receiver } = self;
    drop(sender);

    store.clear();
    for cell in receiver.try_iter() {
      store.add(cell);
    }
    debug_assert!(store.is_deduplicated(), "cycle produced duplicate cells");

    store.mark_published();
    store.len()
  }

  /// Drop the queued results without touching any store.
  pub fn discard(self) -> usize {
    self.receiver.try_iter().count()
  }
}
