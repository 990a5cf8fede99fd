//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the optional config file
//! - Overlay environment values read once
//! - Validate and resolve the identity snapshot

use std::path::Path;

use crate::config::{
    apply_env_overrides, load_config, validate_config, ConfigError, RejectedOverride, TesterConfig,
};
use crate::identity::IdentitySnapshot;

/// Build the effective configuration.
///
/// Without a file the defaults are used; environment values win over both.
/// Environment values that could not be applied are returned alongside the
/// config so they can be logged once a subscriber exists.
pub fn resolve_config<F>(
    path: Option<&Path>,
    lookup: F,
) -> Result<(TesterConfig, Vec<RejectedOverride>), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => TesterConfig::default(),
    };

    let rejected = apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok((config, rejected))
}

/// Resolve the identity snapshot for a configuration.
pub fn resolve_identity(config: &TesterConfig) -> IdentitySnapshot {
    IdentitySnapshot::resolve(&config.identity, config.sidecar_status.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_env() {
        let (config, rejected) = resolve_config(None, |key| match key {
            "SERVICE_NAME" => Some("ratings".to_string()),
            "ERRORS" => Some("100".to_string()),
            "SIDECAR_STATUS" => Some(r#"{"revision":"1-23"}"#.to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.faults.error_percent, 100);
        assert!(rejected.is_empty());

        let identity = resolve_identity(&config);
        assert_eq!(identity.service_name, "ratings");
        assert_eq!(identity.revision, "1-23");
    }

    #[test]
    fn test_rejected_env_values_are_reported() {
        let (config, rejected) = resolve_config(None, |key| match key {
            "LATENCY" => Some("slow".to_string()),
            "ERRORS" => Some("12".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.faults.latency_ms, 0);
        assert_eq!(config.faults.error_percent, 12);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].key, "LATENCY");
        assert_eq!(rejected[0].value, "slow");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = resolve_config(Some(Path::new("/nonexistent/obs.toml")), |_| None);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
