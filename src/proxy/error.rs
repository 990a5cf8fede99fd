//! Proxy hop errors.

use std::error::Error as _;
use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Message returned when a scheme other than `http` is requested.
pub const UNSUPPORTED_PROTOCOL_MESSAGE: &str = "only http proxying is supported in current version";

/// Everything that can go wrong on the way to, or back from, an upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The path asked for a scheme other than `http`.
    #[error("only http proxying is supported in current version (requested {0:?})")]
    UnsupportedProtocol(String),

    /// The remainder of the path is not a usable `host[:port][/path]`.
    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Connecting or exchanging with the upstream failed.
    #[error("request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    /// No complete upstream response within the deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The upstream body could not be read (or exceeded the limit).
    #[error("failed to read upstream body: {0}")]
    Body(#[source] axum::Error),

    /// The upstream answered with a 4xx/5xx status.
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl ProxyError {
    /// Whether the caller sees this as a 200 text reply instead of an error status.
    ///
    /// Upstream and transport failures are reported in-band so a test
    /// harness can read them; only an unsupported protocol is a 500.
    pub fn is_masked(&self) -> bool {
        !matches!(self, ProxyError::UnsupportedProtocol(_))
    }

    /// Display text including every source in the chain.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            detail.push_str(": ");
            detail.push_str(&err.to_string());
            source = err.source();
        }
        detail
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::UnsupportedProtocol(_) => "unsupported_protocol",
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::Transport(_) => "transport",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Body(_) => "body",
            ProxyError::Status { .. } => "status",
        }
    }
}
