//! Echo handler: reflects the inbound request headers.

use std::time::Instant;

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::http::headers::build_response_headers;
use crate::http::response::{echoed_headers, ServiceReply};
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /`
pub async fn echo(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();
    tracing::info!("invoking echo handler");

    let service = &state.identity.service_name;
    let outcome = state.faults.apply(&mut StdRng::from_entropy()).await;

    let reply = if outcome.failed {
        ServiceReply::failed(service)
    } else {
        ServiceReply::ok(service).with_headers(echoed_headers(&headers))
    };

    metrics::record_request("echo", reply.status_code, start);
    reply.into_response(build_response_headers(start, &state.identity))
}
