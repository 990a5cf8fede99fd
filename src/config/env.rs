//! Environment overrides applied once at startup.
//!
//! Each setting is looked up under its upper-case name first
//! (`SERVICE_NAME`) and then its dotted name (`service.name`).
//!
//! Runs before logging is installed, so values that cannot be applied are
//! returned to the caller instead of logged here.

use crate::config::schema::TesterConfig;

/// An environment value that was present but not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedOverride {
    /// The variable name as it was found.
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Overlay environment values onto `config`.
///
/// `lookup` is usually `|key| std::env::var(key).ok()`. Unparseable numeric
/// values leave the config untouched and are reported in the returned list.
pub fn apply_env_overrides<F>(config: &mut TesterConfig, lookup: F) -> Vec<RejectedOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |upper: &'static str, dotted: &'static str| {
        lookup(upper)
            .map(|value| (upper, value))
            .or_else(|| lookup(dotted).map(|value| (dotted, value)))
    };
    let mut rejected = Vec::new();

    let identity = &mut config.identity;
    let fields = [
        ("SERVICE_NAME", "service.name", &mut identity.service_name),
        ("SERVICE_POD", "service.pod", &mut identity.pod_name),
        ("SERVICE_NAMESPACE", "service.namespace", &mut identity.namespace),
        ("SERVICE_REVISION", "service.revision", &mut identity.revision),
        ("SERVICE_CLUSTER", "service.cluster", &mut identity.cluster_name),
    ];
    for (upper, dotted, slot) in fields {
        if let Some((_, value)) = get(upper, dotted) {
            *slot = value;
        }
    }

    let numbers = [
        ("LATENCY", "latency", &mut config.faults.latency_ms),
        ("ERRORS", "errors", &mut config.faults.error_percent),
    ];
    for (upper, dotted, slot) in numbers {
        let Some((key, value)) = get(upper, dotted) else {
            continue;
        };
        match value.trim().parse::<i64>() {
            Ok(parsed) => *slot = parsed,
            Err(e) => rejected.push(RejectedOverride {
                key,
                value,
                reason: e.to_string(),
            }),
        }
    }

    if let Some(value) = lookup("SIDECAR_STATUS") {
        config.sidecar_status = Some(value);
    }

    rejected
}
