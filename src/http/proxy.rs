//! Proxy handler: forwards one GET to the target named in the path.
//!
//! # Design Decisions
//! - Only `http` is proxied; any other scheme is a 500 with a message
//! - Fault injection runs right after the protocol check, before the target
//!   is validated or called, exactly as for echo
//! - The target is cut from the raw request path, so percent-escapes in it
//!   are forwarded as sent
//! - Upstream error statuses and transport failures are reported as a
//!   200 text body naming this service and the URL. Callers of a mesh test
//!   harness read the failure in-band; the real status is not relayed.
//! - Redirects are not followed. A 3xx reply is relayed as a 200 carrying
//!   the upstream `Location`, and the caller decides whether to chase it.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rand::{rngs::StdRng, SeedableRng};

use crate::http::headers::{build_response_headers, PROXIED_BY};
use crate::http::response::ServiceReply;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{relayable_headers, ProxyError, ProxyTarget, UpstreamReply, UNSUPPORTED_PROTOCOL_MESSAGE};

/// `GET /p/{proto}/{*target}`
pub async fn proxy(
    State(state): State<AppState>,
    Path((proto, _)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let remainder = raw_remainder(&uri);
    tracing::info!(protocol = %proto, service = %remainder, "invoking proxy handler");

    if let Err(e) = ProxyTarget::check_protocol(&proto) {
        return unsupported_protocol(&state, start, &e);
    }

    let outcome = state.faults.apply(&mut StdRng::from_entropy()).await;
    if outcome.failed {
        metrics::record_request("proxy", StatusCode::INTERNAL_SERVER_ERROR.as_u16(), start);
        return ServiceReply::failed(&state.identity.service_name)
            .into_response(build_response_headers(start, &state.identity));
    }

    let target = match ProxyTarget::resolve(&proto, remainder, uri.query()) {
        Ok(target) => target,
        Err(e) if !e.is_masked() => return unsupported_protocol(&state, start, &e),
        Err(e) => {
            let url = format!("http://{}", remainder.trim_start_matches('/'));
            return masked_failure(&state, start, &url, &e);
        }
    };

    match state.forwarder.forward(&target, &headers, &state.proxied_by).await {
        Ok(reply) => relay(&state, start, reply),
        Err(e) => masked_failure(&state, start, target.url().as_str(), &e),
    }
}

/// The `{*target}` part of the path as it arrived, before percent-decoding.
fn raw_remainder(uri: &Uri) -> &str {
    uri.path()
        .strip_prefix("/p/")
        .and_then(|rest| rest.split_once('/'))
        .map_or("", |(_, remainder)| remainder)
}

fn relay(state: &AppState, start: Instant, reply: UpstreamReply) -> Response {
    metrics::record_upstream("ok");
    metrics::record_request("proxy", StatusCode::OK.as_u16(), start);
    tracing::debug!(status = %reply.status, "relaying upstream response");

    let mut headers = build_response_headers(start, &state.identity);
    headers.append(PROXIED_BY, state.proxied_by.clone());
    for (name, value) in relayable_headers(&reply.headers).iter() {
        headers.append(name.clone(), value.clone());
    }

    let mut response = Response::new(Body::from(reply.body));
    *response.headers_mut() = headers;
    response
}

fn unsupported_protocol(state: &AppState, start: Instant, err: &ProxyError) -> Response {
    tracing::warn!(error = %err, "rejecting proxy request");
    metrics::record_request("proxy", StatusCode::INTERNAL_SERVER_ERROR.as_u16(), start);

    ServiceReply::failed(&state.identity.service_name)
        .with_message(UNSUPPORTED_PROTOCOL_MESSAGE)
        .into_response(build_response_headers(start, &state.identity))
}

fn masked_failure(state: &AppState, start: Instant, url: &str, err: &ProxyError) -> Response {
    let detail = err.detail();
    tracing::error!(url = %url, kind = err.kind(), error = %detail, "proxy call failed");
    metrics::record_upstream(err.kind());
    metrics::record_request("proxy", StatusCode::OK.as_u16(), start);

    let message = format!(
        "{} called {} and got error return: {}",
        state.identity.service_name, url, detail
    );
    let headers: HeaderMap = build_response_headers(start, &state.identity);
    (StatusCode::OK, headers, message).into_response()
}
