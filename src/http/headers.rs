//! Diagnostic response headers.
//!
//! # Responsibilities
//! - Identify the serving instance on every response
//! - Report how long the instance spent on the request
//!
//! # Design Decisions
//! - Durations use the ISO-8601 `PT…S` form (e.g. `PT0.003512S`)
//! - An identity value that cannot be a header value is skipped, not fatal

use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::identity::IdentitySnapshot;

pub const X_CLUSTER_NAME: HeaderName = HeaderName::from_static("x-cluster-name");
pub const X_NAMESPACE: HeaderName = HeaderName::from_static("x-namespace");
pub const X_SERVICE_NAME: HeaderName = HeaderName::from_static("x-service-name");
pub const X_POD_NAME: HeaderName = HeaderName::from_static("x-pod-name");
pub const X_ISTIO_REVISION: HeaderName = HeaderName::from_static("x-istio-revision");
pub const X_SERVICE_DURATION: HeaderName = HeaderName::from_static("x-service-duration");
pub const PROXIED_BY: HeaderName = HeaderName::from_static("proxied-by");

/// Build the diagnostic header set for a response to a request that began at `start`.
pub fn build_response_headers(start: Instant, identity: &IdentitySnapshot) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(7);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let fields = [
        (X_CLUSTER_NAME, &identity.cluster_name),
        (X_NAMESPACE, &identity.namespace),
        (X_SERVICE_NAME, &identity.service_name),
        (X_POD_NAME, &identity.pod_name),
        (X_ISTIO_REVISION, &identity.revision),
    ];
    for (name, value) in fields {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, value = %value, "identity value is not a valid header value"),
        }
    }

    let elapsed = format_duration(start.elapsed());
    if let Ok(value) = HeaderValue::from_str(&elapsed) {
        headers.insert(X_SERVICE_DURATION, value);
    }

    headers
}

/// Format a duration as ISO-8601, e.g. `PT0S`, `PT0.25S`, `PT1M5.000123S`, `PT2H`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let nanos = duration.subsec_nanos();

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds == 0 && nanos == 0 && out.len() > 2 {
        return out;
    }

    out.push_str(&seconds.to_string());
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('S');
    out
}

/// Parse the output of [`format_duration`].
pub fn parse_duration(value: &str) -> Option<Duration> {
    let mut rest = value.strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
        let (number, unit) = rest.split_at(end);
        if number.is_empty() {
            return None;
        }
        let unit_char = unit.chars().next()?;
        let part = match unit_char {
            'H' => Duration::from_secs(number.parse::<u64>().ok()?.checked_mul(3600)?),
            'M' => Duration::from_secs(number.parse::<u64>().ok()?.checked_mul(60)?),
            'S' => parse_seconds(number)?,
            _ => return None,
        };
        total = total.checked_add(part)?;
        rest = &unit[1..];
    }
    Some(total)
}

fn parse_seconds(number: &str) -> Option<Duration> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs = whole.parse::<u64>().ok()?;
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse::<u32>().ok()?
    };
    Some(Duration::new(secs, nanos))
}
