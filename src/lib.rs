//! Settlement PnL feed.
//!
//! # Overview
//!
//! Long-running ingestion of `MarginSettled` events from a single
//! on-chain contract. Each event's margin delta is rendered as a signed
//! fixed-point string and forwarded to an external aggregation service
//! that keeps a running per-trader total.
//!
//! [`listener::SettleListener`] owns the websocket subscription and
//! reconnects after any disconnect; [`pipeline::Pipeline`] deduplicates
//! by transaction hash + log index and dispatches forwards without
//! blocking the stream; [`forward::PnlClient`] talks to the service's
//! `add_pnl` procedure.
//!
//! # Limitations/follow-ups
//!
//! * The dedup window is in-memory only; a process restart forgets it,
//!   so duplicates replayed across restarts are reprocessed.
//!
//! * Events emitted while disconnected are not backfilled.
//!
//! * A failed forward is logged and dropped; there is no retry queue.

pub mod abi;
pub mod dedup;
pub mod error;
pub mod forward;
pub mod listener;
pub mod num;
pub mod pipeline;
pub mod types;
