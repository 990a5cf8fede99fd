//! Single-hop request forwarding.
//!
//! # Responsibilities
//! - Build the outbound GET with filtered headers
//! - Bound the whole exchange (connect, response, body) with a timeout
//! - Hand back the buffered upstream response
//!
//! # Design Decisions
//! - Exactly one attempt; no retries, no redirects followed
//! - Inbound `Host` is never forwarded; the client writes the target's own
//! - Upstream 4xx/5xx come back as `ProxyError::Status` so callers can mask them

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::http::headers::PROXIED_BY;
use crate::proxy::error::ProxyError;
use crate::proxy::target::ProxyTarget;

/// A buffered upstream response.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP client for the proxy hop.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Overall deadline for one hop.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one GET to `target` carrying the inbound headers.
    pub async fn forward(
        &self,
        target: &ProxyTarget,
        inbound: &HeaderMap,
        proxied_by: &HeaderValue,
    ) -> Result<UpstreamReply, ProxyError> {
        let mut request = Request::new(Body::empty());
        *request.uri_mut() = target.to_uri()?;
        *request.headers_mut() = outbound_headers(inbound, proxied_by);

        tracing::debug!(uri = %target, headers = ?request.headers(), "forwarding request");

        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProxyError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, request: Request<Body>) -> Result<UpstreamReply, ProxyError> {
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();

        let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
            .await
            .map_err(ProxyError::Body)?;

        tracing::debug!(status = %parts.status, bytes = body.len(), "upstream responded");

        if parts.status.is_client_error() || parts.status.is_server_error() {
            return Err(ProxyError::Status {
                status: parts.status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(UpstreamReply {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

/// Headers for the outbound request: every inbound header except `Host`,
/// plus a `Proxied-By` entry for this service.
pub fn outbound_headers(inbound: &HeaderMap, proxied_by: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if name == header::HOST {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers.append(PROXIED_BY, proxied_by.clone());
    headers
}

/// Upstream response headers that may be relayed to the caller.
///
/// `Transfer-Encoding` describes the upstream framing, which the relayed
/// response does not share.
pub fn relayable_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if name == header::HOST || name == header::TRANSFER_ENCODING {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
