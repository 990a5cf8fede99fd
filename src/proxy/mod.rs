//! Outbound proxy hop subsystem.
//!
//! # Data Flow
//! ```text
//! GET /p/{proto}/{host:port/path}
//!     → target.rs (scheme check, URL validation)
//!     → [fault injection]
//!     → forward.rs (filtered headers, bounded GET)
//!     → error.rs (unsupported protocol vs. masked upstream failure)
//! ```

pub mod error;
pub mod forward;
pub mod target;

pub use error::{ProxyError, UNSUPPORTED_PROTOCOL_MESSAGE};
pub use forward::{outbound_headers, relayable_headers, Forwarder, UpstreamReply};
pub use target::ProxyTarget;
