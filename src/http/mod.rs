//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → echo.rs / proxy.rs (fault injection first, then the work)
//!     → control.rs (fault settings, crash)
//!     → headers.rs (diagnostic headers on every response)
//!     → response.rs (JSON bodies)
//!     → Send to client
//! ```

pub mod control;
pub mod echo;
pub mod headers;
pub mod proxy;
pub mod response;
pub mod server;
pub mod status_page;

pub use control::CrashHook;
pub use headers::{build_response_headers, format_duration, parse_duration};
pub use response::ServiceReply;
pub use server::{AppState, HttpServer};
