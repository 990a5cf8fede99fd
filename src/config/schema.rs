//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tester.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::faults::FaultSettings;
use crate::identity::UNSET;

/// Root configuration for the tester.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TesterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Static identity reported in diagnostic headers.
    pub identity: IdentityConfig,

    /// Initial fault injection values.
    pub faults: FaultSettings,

    /// Outbound proxy hop settings.
    pub upstream: UpstreamConfig,

    /// Server-side timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Raw sidecar status JSON; may override `identity.revision`.
    pub sidecar_status: Option<String>,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Identity fields as configured, before sidecar resolution.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub service_name: String,
    pub pod_name: String,
    pub namespace: String,
    pub revision: String,
    pub cluster_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            service_name: UNSET.to_string(),
            pod_name: UNSET.to_string(),
            namespace: UNSET.to_string(),
            revision: UNSET.to_string(),
            cluster_name: UNSET.to_string(),
        }
    }
}

/// Outbound proxy hop configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Total time for the upstream request and body, in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Largest upstream body relayed, in bytes.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Optional bound on total request handling, in seconds.
    ///
    /// Unset by default so induced latency is never cut short. When set, a
    /// request still running at the bound is answered with 504 and the
    /// usual diagnostic headers.
    pub request_secs: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
