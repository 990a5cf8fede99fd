//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (SERVICE_*, LATENCY, ERRORS, SIDECAR_STATUS overlay)
//!     → validation.rs (semantic checks)
//!     → TesterConfig (validated)
//!     → IdentitySnapshot (immutable) + FaultController (live)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server replaces the fault settings
//! ```
//!
//! # Design Decisions
//! - Identity is fixed at startup; only fault values change at runtime
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use env::{apply_env_overrides, RejectedOverride};
pub use loader::{load_config, ConfigError};
pub use schema::{
    IdentityConfig, ListenerConfig, ObservabilityConfig, TesterConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
