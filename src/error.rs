use alloy::{
    sol_types,
    transports::{RpcError, TransportErrorKind},
};

/// Error returned by the feed's transport and decoding layers.
///
/// Per-event failures (decode, forward) are handled where they occur
/// and never surface here; this type covers the session-level failures
/// that end a subscription and trigger a reconnect.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("subscription rejected: {0}")]
    SubscriptionRejected(String),

    #[error("log decode error: {0}")]
    Decode(String),
}

impl From<RpcError<TransportErrorKind>> for FeedError {
    fn from(value: RpcError<TransportErrorKind>) -> Self {
        match value {
            RpcError::ErrorResp(ref resp) => Self::SubscriptionRejected(resp.to_string()),
            _ => Self::Transport(value.to_string()),
        }
    }
}

impl From<sol_types::Error> for FeedError {
    fn from(value: sol_types::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
