//! Fault injection subsystem.
//!
//! # Data Flow
//! ```text
//! POST /latency/{ms}, POST /errors/{rate}, config reload
//!     → controller.rs (read-copy-update of FaultSettings)
//!
//! Every echo/proxy request:
//!     → controller.rs apply() (one snapshot, sleep, one draw)
//!     → FaultOutcome { delayed, failed }
//! ```
//!
//! # Design Decisions
//! - Settings live behind an atomic pointer swap, never a global
//! - A request reads the pair once; latency and error rate always belong together
//! - Values are stored verbatim; the threshold semantics are applied when read

pub mod controller;

pub use controller::{FaultController, FaultOutcome, FaultSettings};
