//! Human-facing connection status page.

use std::time::Instant;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::http::headers::build_response_headers;
use crate::http::server::AppState;
use crate::identity::IdentitySnapshot;

/// `GET /connection`
pub async fn connection(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let page = render(&state.identity);
    (build_response_headers(start, &state.identity), Html(page)).into_response()
}

pub fn render(identity: &IdentitySnapshot) -> String {
    let rows = [
        ("Service", &identity.service_name),
        ("Cluster", &identity.cluster_name),
        ("Namespace", &identity.namespace),
        ("Revision", &identity.revision),
        ("Pod", &identity.pod_name),
    ]
    .iter()
    .map(|(label, value)| format!("      <tr><th>{}</th><td>{}</td></tr>\n", label, escape(value)))
    .collect::<String>();

    format!(
        "<!DOCTYPE html>\n<html>\n  <head><title>{} connection</title></head>\n  <body>\n    <h1>Connected to {}</h1>\n    <table>\n{}    </table>\n  </body>\n</html>\n",
        escape(&identity.service_name),
        escape(&identity.service_name),
        rows
    )
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
