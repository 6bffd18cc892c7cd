//! Forwarding of settled deltas to the external aggregation service.

use alloy::primitives::Address;
use tracing::{debug, error};

/// Destination for per-trader PnL deltas.
///
/// `push` reports the service's new running total on success and `None`
/// on any failure; implementations never let an error escape their own
/// boundary. The trait is the injection seam the pipeline is generic
/// over.
pub trait PnlSink: Clone + Send + Sync + 'static {
    fn push(&self, trader: Address, delta: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Canonical lowercase `0x`-prefixed form of an account address, the
/// identity the aggregation service keys its totals by.
pub fn canonical_trader(trader: Address) -> String {
    format!("{trader:#x}")
}

/// Named parameters of the `add_pnl` remote procedure.
#[derive(Debug, serde::Serialize)]
struct AddPnlParams<'a> {
    p_trader: String,
    p_delta_x6: &'a str,
}

/// HTTP client for the aggregation service's `add_pnl` procedure,
/// exposed PostgREST-style under `rest/v1/rpc/`.
#[derive(Clone, Debug)]
pub struct PnlClient {
    endpoint: String,
    service_key: String,
    client: reqwest::Client,
}

impl PnlClient {
    pub fn new(base_url: &url::Url, service_key: String) -> Self {
        let endpoint = format!(
            "{}/rest/v1/rpc/add_pnl",
            base_url.as_str().trim_end_matches('/')
        );
        Self {
            endpoint,
            service_key,
            client: reqwest::Client::new(),
        }
    }
}

impl PnlSink for PnlClient {
    async fn push(&self, trader: Address, delta: &str) -> Option<String> {
        let params = AddPnlParams {
            p_trader: canonical_trader(trader),
            p_delta_x6: delta,
        };
        debug!(trader = %params.p_trader, delta, "calling add_pnl");

        let resp = match self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&params)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!(trader = %params.p_trader, delta, error = %e, "add_pnl call failed");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                trader = %params.p_trader,
                delta,
                %status,
                body,
                "add_pnl rejected by service"
            );
            return None;
        }

        match resp.json::<serde_json::Value>().await {
            Ok(total) => Some(render_total(&total)),
            Err(e) => {
                error!(trader = %params.p_trader, delta, error = %e, "add_pnl response unreadable");
                None
            }
        }
    }
}

/// The procedure returns the new total as a JSON scalar; PostgREST may
/// serialize numerics either as a number or as a quoted string.
fn render_total(total: &serde_json::Value) -> String {
    match total {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
