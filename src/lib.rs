//! Service-mesh diagnostic endpoint library.
//!
//! Echoes request metadata, forwards single proxy hops, and injects
//! latency and errors that can be changed while the process runs.

pub mod config;
pub mod faults;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::schema::TesterConfig;
pub use faults::{FaultController, FaultOutcome, FaultSettings};
pub use http::HttpServer;
pub use identity::IdentitySnapshot;
pub use lifecycle::Shutdown;
