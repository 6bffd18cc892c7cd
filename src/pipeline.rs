//! Per-event processing: dedup, delta computation, forward dispatch.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    dedup::SeenCache,
    forward::{PnlSink, canonical_trader},
    num::Converter,
    types::SettlementEvent,
};

/// The single consumer of decoded settlement events.
///
/// Owns the dedup cache; `handle` runs the dedup-and-format section
/// synchronously on the caller's task, so identity recording never
/// races with itself, then hands the forward call off to its own task
/// so a slow remote call does not hold up the next notification.
pub struct Pipeline<S: PnlSink> {
    seen: SeenCache,
    converter: Converter,
    sink: S,
}

impl<S: PnlSink> Pipeline<S> {
    pub fn new(seen: SeenCache, converter: Converter, sink: S) -> Self {
        Self {
            seen,
            converter,
            sink,
        }
    }

    /// Process one decoded event.
    ///
    /// Returns the handle of the spawned forward task, or `None` when
    /// the event was a duplicate and produced no effect. Callers in the
    /// live path ignore the handle; tests await it.
    pub fn handle(&mut self, event: SettlementEvent) -> Option<JoinHandle<()>> {
        let id = event.id();
        if self.seen.contains(&id) {
            debug!(%id, "duplicate delivery, skipping");
            return None;
        }
        self.seen.insert(id);

        let delta = self
            .converter
            .delta_string(event.close_margin, event.open_margin);
        let trader = canonical_trader(event.trader);
        debug!(
            %trader,
            %delta,
            profit = %event.profit,
            trader_won = event.trader_won,
            block = event.block_number,
            "settlement received"
        );

        let sink = self.sink.clone();
        let block = event.block_number;
        Some(tokio::spawn(async move {
            match sink.push(event.trader, &delta).await {
                Some(total) => {
                    info!(%trader, %delta, %total, block, "pnl delta forwarded");
                }
                None => {
                    // Dropped permanently; identity and amounts logged
                    // so the gap can be reconciled by hand.
                    warn!(%trader, %delta, event = %id, block, "pnl delta dropped");
                }
            }
        }))
    }

    /// Number of identities currently retained by the dedup cache.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }
}
