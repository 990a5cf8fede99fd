//! Control endpoints: live fault settings and a deliberate crash.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::http::headers::build_response_headers;
use crate::http::response::ServiceReply;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Called by `POST /crash/{message}` with the message.
pub type CrashHook = Arc<dyn Fn(&str) + Send + Sync>;

/// The production hook: terminate the process immediately.
pub fn exit_process() -> CrashHook {
    Arc::new(|_: &str| {
        std::process::exit(-1);
    })
}

/// `POST /errors/{rate}`
pub async fn set_errors(State(state): State<AppState>, Path(rate): Path<i64>) -> Response {
    let start = Instant::now();
    tracing::info!(error_percent = rate, "setting errors");

    let settings = state.faults.set_error_percent(rate);
    metrics::record_request("errors", StatusCode::OK.as_u16(), start);

    ServiceReply::ok(&state.identity.service_name)
        .with_message(format!("errors percentage set to: {}%", settings.error_percent))
        .into_response(build_response_headers(start, &state.identity))
}

/// `POST /latency/{ms}`
pub async fn set_latency(State(state): State<AppState>, Path(ms): Path<i64>) -> Response {
    let start = Instant::now();
    tracing::info!(latency_ms = ms, "setting latency");

    let settings = state.faults.set_latency(ms);
    metrics::record_request("latency", StatusCode::OK.as_u16(), start);

    ServiceReply::ok(&state.identity.service_name)
        .with_message(format!("latency set to: {}ms", settings.latency_ms))
        .into_response(build_response_headers(start, &state.identity))
}

/// `POST /crash/{message}`
///
/// With the production hook this never returns.
pub async fn crash(State(state): State<AppState>, Path(message): Path<String>) -> StatusCode {
    tracing::warn!(service = %state.identity.service_name, "Forcing crash");
    tracing::info!(last_words = %message, "last words");

    (state.crash_hook)(&message);
    StatusCode::ACCEPTED
}
