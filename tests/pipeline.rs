//! Pipeline behavior tests with a recording sink standing in for the
//! aggregation service.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use alloy::primitives::{Address, TxHash, U256};
use pnl_feed::{
    dedup::SeenCache, forward::PnlSink, num::Converter, pipeline::Pipeline,
    types::SettlementEvent,
};

/// Sink that records every call and keeps a running total per test, in
/// millionths. Traders listed in `failing` get the service-error
/// treatment: the call is recorded but no total comes back.
#[derive(Clone, Default)]
struct RecordingSink {
    calls: Arc<Mutex<Vec<(Address, String)>>>,
    failing: Arc<Mutex<HashSet<Address>>>,
    total_micro: Arc<Mutex<i128>>,
}

impl RecordingSink {
    fn fail_for(&self, trader: Address) {
        self.failing.lock().unwrap().insert(trader);
    }

    fn calls(&self) -> Vec<(Address, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn total_micro(&self) -> i128 {
        *self.total_micro.lock().unwrap()
    }
}

/// Parse a 6-fractional-digit delta string back into millionths.
fn micros(delta: &str) -> i128 {
    let (sign, rest) = match delta.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, delta),
    };
    let (int, frac) = rest.split_once('.').unwrap();
    sign * (int.parse::<i128>().unwrap() * 1_000_000 + frac.parse::<i128>().unwrap())
}

impl PnlSink for RecordingSink {
    async fn push(&self, trader: Address, delta: &str) -> Option<String> {
        self.calls.lock().unwrap().push((trader, delta.to_string()));
        if self.failing.lock().unwrap().contains(&trader) {
            return None;
        }
        let mut total = self.total_micro.lock().unwrap();
        *total += micros(delta);
        Some(total.to_string())
    }
}

fn settlement(trader_byte: u8, open: u64, close: u64, tx_byte: u8, log_index: u64) -> SettlementEvent {
    SettlementEvent {
        trader: Address::with_last_byte(trader_byte),
        open_margin: U256::from(open),
        close_margin: U256::from(close),
        profit: U256::ZERO,
        trader_won: close >= open,
        tx_hash: TxHash::with_last_byte(tx_byte),
        log_index,
        block_number: 100,
    }
}

fn pipeline(sink: RecordingSink, capacity: usize) -> Pipeline<RecordingSink> {
    Pipeline::new(SeenCache::new(capacity), Converter::new(6), sink)
}

#[tokio::test]
async fn test_duplicate_identity_forwards_once() {
    let sink = RecordingSink::default();
    let mut pipeline = pipeline(sink.clone(), 100);

    let event = settlement(1, 1_000_000, 3_500_000, 0xaa, 7);

    let handle = pipeline.handle(event.clone()).expect("first delivery runs");
    handle.await.unwrap();

    // Same identity again, before any eviction: no effect.
    assert!(pipeline.handle(event).is_none());

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "2.500000");
}

#[tokio::test]
async fn test_forward_failure_isolation() {
    let sink = RecordingSink::default();
    let mut pipeline = pipeline(sink.clone(), 100);

    let losing = settlement(1, 2_000_000, 500_000, 0xaa, 0);
    let winning = settlement(2, 1_000_000, 2_000_000, 0xbb, 0);

    sink.fail_for(losing.trader);

    pipeline.handle(losing).unwrap().await.unwrap();
    pipeline.handle(winning).unwrap().await.unwrap();

    // Both forwards were issued; only the second one landed.
    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "-1.500000");
    assert_eq!(calls[1].1, "1.000000");
    assert_eq!(sink.total_micro(), 1_000_000);
}

#[tokio::test]
async fn test_eviction_reopens_dedup_window() {
    let sink = RecordingSink::default();
    let mut pipeline = pipeline(sink.clone(), 2);

    let first = settlement(1, 0, 1_000_000, 0x01, 0);

    pipeline.handle(first.clone()).unwrap().await.unwrap();
    pipeline
        .handle(settlement(1, 0, 1_000_000, 0x02, 0))
        .unwrap()
        .await
        .unwrap();
    pipeline
        .handle(settlement(1, 0, 1_000_000, 0x03, 0))
        .unwrap()
        .await
        .unwrap();

    // Cache stayed at capacity and the oldest identity fell out, so a
    // late duplicate of it is reprocessed.
    assert_eq!(pipeline.seen_len(), 2);
    pipeline.handle(first).unwrap().await.unwrap();
    assert_eq!(sink.calls().len(), 4);
}

#[tokio::test]
async fn test_delta_rendering_through_pipeline() {
    let sink = RecordingSink::default();
    let mut pipeline = pipeline(sink.clone(), 100);

    pipeline
        .handle(settlement(1, 0, 12_345_678, 0x01, 0))
        .unwrap()
        .await
        .unwrap();
    pipeline
        .handle(settlement(1, 100_000, 0, 0x02, 0))
        .unwrap()
        .await
        .unwrap();
    pipeline
        .handle(settlement(1, 42, 42, 0x03, 0))
        .unwrap()
        .await
        .unwrap();

    let deltas: Vec<String> = sink.calls().into_iter().map(|(_, d)| d).collect();
    assert_eq!(deltas, vec!["12.345678", "-0.100000", "0.000000"]);
}

#[tokio::test]
async fn test_same_log_index_in_different_transactions_is_distinct() {
    let sink = RecordingSink::default();
    let mut pipeline = pipeline(sink.clone(), 100);

    pipeline
        .handle(settlement(1, 0, 1_000_000, 0x01, 3))
        .unwrap()
        .await
        .unwrap();
    pipeline
        .handle(settlement(1, 0, 1_000_000, 0x02, 3))
        .unwrap()
        .await
        .unwrap();

    assert_eq!(sink.calls().len(), 2);
}
