//! Subscription lifecycle: connect, subscribe, drain, reconnect.

use std::{future::IntoFuture, time::Duration};

use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder, WsConnect},
    rpc::types::Filter,
    sol_types::SolEvent,
};
use futures::StreamExt;
use tokio::sync::watch;
use tracing::{error, info, warn};
use url::Url;

use crate::{
    abi::MarginSettled, error::FeedError, forward::PnlSink, pipeline::Pipeline,
    types::SettlementEvent,
};

/// Delay between teardown and the next connection attempt. Fixed, not
/// exponential: one upstream, bounded event rate, nothing to be gained
/// from backing off further.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Why a subscription session ended.
enum SessionEnd {
    Shutdown,
    StreamClosed,
}

/// Await `fut` unless shutdown is signalled first.
///
/// The flag is only ever raised (and a dropped sender counts as
/// raised), so any wake on the channel means stop.
async fn or_shutdown<T>(
    shutdown: &mut watch::Receiver<bool>,
    fut: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        out = fut => Some(out),
        _ = shutdown.changed() => None,
    }
}

/// Owns the websocket endpoint and drives the one live subscription.
///
/// The transport and subscription handles live inside [`session`][1],
/// so every exit path (clean close, transport error, shutdown) drops
/// them before anything else happens; there is no state in which two
/// subscriptions coexist. The dedup cache inside the pipeline survives
/// across sessions.
///
/// [1]: SettleListener::session
pub struct SettleListener<S: PnlSink> {
    ws_url: Url,
    contract: Address,
    reconnect_delay: Duration,
    pipeline: Pipeline<S>,
}

impl<S: PnlSink> SettleListener<S> {
    pub fn new(
        ws_url: Url,
        contract: Address,
        reconnect_delay: Duration,
        pipeline: Pipeline<S>,
    ) -> Self {
        Self {
            ws_url,
            contract,
            reconnect_delay,
            pipeline,
        }
    }

    /// Run until shutdown is requested.
    ///
    /// Transport failures are never fatal: each ended session is logged
    /// and followed by exactly one reconnect attempt after the fixed
    /// delay. The shutdown signal short-circuits every wait in the
    /// cycle, including a connect attempt that hangs; once observed, no
    /// further attempt is made.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                info!("shutdown requested before connect");
                return;
            }

            info!(url = %self.ws_url, "connecting to event source");
            match self.session(&mut shutdown).await {
                Ok(SessionEnd::Shutdown) => {
                    info!("shutdown requested, subscription torn down");
                    return;
                }
                Ok(SessionEnd::StreamClosed) => warn!("event stream closed by remote"),
                Err(e) => error!(error = %e, "subscription session failed"),
            }

            info!(
                delay_secs = self.reconnect_delay.as_secs(),
                "reconnecting after delay"
            );
            if or_shutdown(&mut shutdown, tokio::time::sleep(self.reconnect_delay))
                .await
                .is_none()
            {
                info!("shutdown requested during reconnect delay");
                return;
            }
        }
    }

    /// One transport session: connect, install the subscription, drain
    /// it until the stream ends or shutdown is signalled.
    async fn session(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, FeedError> {
        let connect = ProviderBuilder::new().connect_ws(WsConnect::new(self.ws_url.as_str()));
        let Some(connected) = or_shutdown(shutdown, connect).await else {
            return Ok(SessionEnd::Shutdown);
        };
        let provider = connected?;
        info!("transport connected");

        let filter = Filter::new()
            .address(self.contract)
            .event_signature(MarginSettled::SIGNATURE_HASH);
        let Some(subscribed) = or_shutdown(shutdown, provider.subscribe_logs(&filter).into_future()).await
        else {
            return Ok(SessionEnd::Shutdown);
        };
        let mut stream = subscribed?.into_stream();
        info!(
            contract = %self.contract,
            event = MarginSettled::SIGNATURE,
            "subscription installed"
        );

        loop {
            let Some(maybe_log) = or_shutdown(shutdown, stream.next()).await else {
                return Ok(SessionEnd::Shutdown);
            };
            let Some(log) = maybe_log else {
                return Ok(SessionEnd::StreamClosed);
            };
            match SettlementEvent::decode(&log) {
                Ok(event) => {
                    self.pipeline.handle(event);
                }
                // A notification that does not match the subscribed
                // shape is skipped, never fatal.
                Err(e) => warn!(error = %e, "undecodable notification, skipping"),
            }
        }
    }
}
