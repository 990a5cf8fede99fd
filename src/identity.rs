//! Identity of the serving instance.
//!
//! # Responsibilities
//! - Hold service/pod/namespace/revision/cluster for the process lifetime
//! - Apply the sidecar-provided revision override once at startup
//!
//! # Design Decisions
//! - Resolved once and shared via Arc; never mutated afterwards
//! - A bad sidecar blob is logged and ignored, never fatal

use serde::Serialize;
use serde_json::Value;

use crate::config::IdentityConfig;

/// Sentinel used for unset values.
pub const UNSET: &str = "-";

/// Immutable identity record reported on every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySnapshot {
    pub service_name: String,
    pub pod_name: String,
    pub namespace: String,
    pub revision: String,
    pub cluster_name: String,
}

/// Revision reported when the sidecar sends `"revision": null`.
pub const DEFAULT_REVISION: &str = "default";

/// Text form of a sidecar `revision` value.
///
/// Strings are taken as-is, null becomes [`DEFAULT_REVISION`], and numbers
/// or booleans use their JSON text. A missing key, an object or an array
/// carries no usable name.
fn revision_text(status: &Value) -> Option<String> {
    match status.get("revision")?.clone() {
        Value::String(s) => Some(s),
        Value::Null => Some(DEFAULT_REVISION.to_string()),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(v.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl IdentitySnapshot {
    /// Resolve the snapshot from static config and an optional sidecar blob.
    pub fn resolve(config: &IdentityConfig, sidecar_status: Option<&str>) -> Self {
        let mut identity = Self {
            service_name: config.service_name.clone(),
            pod_name: config.pod_name.clone(),
            namespace: config.namespace.clone(),
            revision: config.revision.clone(),
            cluster_name: config.cluster_name.clone(),
        };

        let Some(raw) = sidecar_status.map(str::trim).filter(|s| !s.is_empty() && *s != UNSET) else {
            return identity;
        };

        tracing::info!(sidecar_status = %raw, "initializing revision name from sidecar metadata");
        match serde_json::from_str::<Value>(raw).map(|status| revision_text(&status)) {
            Ok(Some(revision)) => {
                tracing::info!(revision = %revision, "revision resolved from sidecar");
                identity.revision = revision;
            }
            Ok(None) => {
                tracing::warn!(
                    revision = %identity.revision,
                    "sidecar metadata has no usable revision, keeping configured value"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    revision = %identity.revision,
                    "failed to parse sidecar metadata, keeping configured value"
                );
            }
        }

        identity
    }
}

impl Default for IdentitySnapshot {
    fn default() -> Self {
        Self::resolve(&IdentityConfig::default(), None)
    }
}
