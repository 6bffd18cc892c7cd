//! Event record and identity types.

use alloy::{
    primitives::{Address, TxHash, U256},
    rpc::types::Log,
    sol_types::SolEvent,
};

use crate::{abi::MarginSettled, error::FeedError};

/// Identity of a single on-chain event occurrence, used as the
/// deduplication key. Unique per real-world occurrence: the containing
/// transaction plus the log position within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId {
    tx_hash: TxHash,
    log_index: u64,
}

impl EventId {
    pub fn new(tx_hash: TxHash, log_index: u64) -> Self {
        Self { tx_hash, log_index }
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.tx_hash, self.log_index)
    }
}

/// One decoded `MarginSettled` occurrence along with its transaction
/// context. Constructed from a raw subscription log, consumed
/// synchronously by the pipeline, not retained afterwards.
#[derive(Clone, Debug)]
pub struct SettlementEvent {
    pub trader: Address,
    pub open_margin: U256,
    pub close_margin: U256,
    pub profit: U256,
    pub trader_won: bool,
    pub tx_hash: TxHash,
    pub log_index: u64,
    pub block_number: u64,
}

impl SettlementEvent {
    /// Decode a raw log delivered by the subscription.
    ///
    /// The filter already restricts delivery to the `MarginSettled`
    /// signature, so a decode failure here means a malformed
    /// notification; the caller logs and skips it.
    pub fn decode(log: &Log) -> Result<Self, FeedError> {
        let decoded = MarginSettled::decode_log(&log.inner)?.data;
        Ok(Self {
            trader: decoded.trader,
            open_margin: decoded.openMargin,
            close_margin: decoded.closeMargin,
            profit: decoded.profit,
            trader_won: decoded.traderWon,
            tx_hash: log.transaction_hash.unwrap_or_default(),
            log_index: log.log_index.unwrap_or_default(),
            block_number: log.block_number.unwrap_or_default(),
        })
    }

    pub fn id(&self) -> EventId {
        EventId::new(self.tx_hash, self.log_index)
    }
}
