//! Proxy target resolution.
//!
//! `/p/{proto}/{host:port/path}` becomes `http://host:port/path`.

use std::fmt;

use axum::http::Uri;
use url::Url;

use crate::proxy::error::ProxyError;

/// A validated outbound destination. The scheme is always `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    url: Url,
}

impl ProxyTarget {
    /// Only `http` is proxied, in any letter case.
    pub fn check_protocol(proto: &str) -> Result<(), ProxyError> {
        if proto.eq_ignore_ascii_case("http") {
            Ok(())
        } else {
            Err(ProxyError::UnsupportedProtocol(proto.to_string()))
        }
    }

    /// Resolve the declared protocol and path remainder into a target.
    ///
    /// `remainder` is taken as raw path text, so percent-escapes such as
    /// `%2F` reach the upstream unchanged. The inbound query string, if
    /// any, is carried over.
    pub fn resolve(proto: &str, remainder: &str, query: Option<&str>) -> Result<Self, ProxyError> {
        Self::check_protocol(proto)?;

        let remainder = remainder.trim_start_matches('/');
        let invalid = |reason: String| ProxyError::InvalidTarget {
            target: remainder.to_string(),
            reason,
        };

        let mut raw = format!("http://{}", remainder);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(query);
        }

        let url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials are not supported".to_string()));
        }

        Ok(Self { url })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// `host[:port]` as it will be addressed.
    pub fn authority(&self) -> String {
        match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => String::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The target as a request URI for the HTTP client.
    pub fn to_uri(&self) -> Result<Uri, ProxyError> {
        self.url
            .as_str()
            .parse::<Uri>()
            .map_err(|e| ProxyError::InvalidTarget {
                target: self.url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
