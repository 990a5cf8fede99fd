//! Proxy hop against live mock upstreams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use obs_tester::config::TesterConfig;
use obs_tester::http::ServiceReply;
use obs_tester::proxy::UNSUPPORTED_PROTOCOL_MESSAGE;

mod common;

use common::MockResponse;

#[tokio::test]
async fn test_unsupported_protocol_is_500() {
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    for proto in ["https", "grpc"] {
        let res = common::client()
            .get(tester.url(&format!("/p/{}/backend:8443/", proto)))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 500);
        assert!(res.headers().contains_key("x-service-duration"));
        let body: ServiceReply = res.json().await.unwrap();
        assert_eq!(body.status_code, 500);
        assert_eq!(body.message.as_deref(), Some(UNSUPPORTED_PROTOCOL_MESSAGE));
    }

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_relays_upstream_and_filters_headers() {
    let backend = common::start_capture_backend().await;
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/HTTP/{}/orders/42?expand=items", backend)))
        .header("x-trace", "abc")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let headers = res.headers().clone();
    assert_eq!(headers["x-upstream"], "backend-1");
    assert_eq!(headers["proxied-by"], "frontend");
    assert_eq!(headers["x-service-name"], "frontend");
    assert_eq!(headers["content-type"], "text/plain");
    assert!(headers.get("transfer-encoding").is_none());
    assert!(headers.get("host").is_none());

    let head = res.text().await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /orders/42?expand=items http/1.1\r\n"), "{}", head);
    assert!(head.contains("x-trace: abc\r\n"));
    assert!(head.contains("proxied-by: frontend\r\n"));
    assert!(head.contains(&format!("host: {}\r\n", backend)));
    assert!(!head.contains(&format!("host: {}\r\n", tester.addr)));

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_target_is_masked() {
    let closed = common::closed_addr().await;
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/http/{}/health", closed)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-service-duration"));
    let body = res.text().await.unwrap();
    assert!(
        body.starts_with(&format!("frontend called http://{}/health and got error return: ", closed)),
        "{}",
        body
    );

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_unresolvable_host_is_masked() {
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url("/p/http/no-such-host.invalid:8080/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body = res.text().await.unwrap();
    assert!(body.contains("frontend called http://no-such-host.invalid:8080/"), "{}", body);

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_error_status_is_masked() {
    let backend = common::start_programmable_backend(|_| async {
        MockResponse::status("503 Service Unavailable", "down for maintenance")
    })
    .await;
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/http/{}/", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("proxied-by").is_none());
    let body = res.text().await.unwrap();
    assert_eq!(
        body,
        format!(
            "frontend called http://{}/ and got error return: 503 Service Unavailable: down for maintenance",
            backend
        )
    );

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let backend = common::start_silent_backend().await;
    let mut config = TesterConfig::default();
    config.upstream.timeout_secs = 1;
    let tester = common::spawn_tester(config, common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/http/{}/", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body = res.text().await.unwrap();
    assert!(body.contains("did not respond within 1s"), "{}", body);

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_induced_failure_skips_upstream() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let backend = common::start_programmable_backend(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        async { MockResponse::ok("reached") }
    })
    .await;

    let mut config = TesterConfig::default();
    config.faults.error_percent = 100;
    let tester = common::spawn_tester(config, common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/http/{}/", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: ServiceReply = res.json().await.unwrap();
    assert_eq!(body.service, "frontend");
    assert_eq!(body.status_code, 500);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_chain_through_two_testers() {
    let backend = common::spawn_tester(TesterConfig::default(), common::identity("reviews")).await;
    let frontend = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(frontend.url(&format!("/p/http/{}/", backend.addr)))
        .header("x-request-id", "chain-1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let services: Vec<_> = res
        .headers()
        .get_all("x-service-name")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(services, ["frontend", "reviews"]);

    let body: ServiceReply = res.json().await.unwrap();
    assert_eq!(body.service, "reviews");
    let echoed = body.headers.unwrap();
    assert_eq!(echoed["proxied-by"], "frontend");
    assert_eq!(echoed["x-request-id"], "chain-1");
    assert_eq!(echoed["host"], backend.addr.to_string());

    backend.shutdown.trigger();
    frontend.shutdown.trigger();
}

#[tokio::test]
async fn test_percent_escapes_reach_upstream() {
    let backend = common::start_capture_backend().await;
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/http/{}/a%2Fb/x%3Fy=1", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let head = res.text().await.unwrap();
    assert!(head.starts_with("GET /a%2Fb/x%3Fy=1 HTTP/1.1\r\n"), "{}", head);

    tester.shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_target_still_gets_faults() {
    let mut config = TesterConfig::default();
    config.faults.error_percent = 100;
    let failing = common::spawn_tester(config, common::identity("frontend")).await;

    let res = common::client()
        .get(failing.url("/p/http/host:notaport/x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let body: ServiceReply = res.json().await.unwrap();
    assert_eq!(body.status_code, 500);
    failing.shutdown.trigger();

    let mut config = TesterConfig::default();
    config.faults.latency_ms = 300;
    let slow = common::spawn_tester(config, common::identity("frontend")).await;

    let start = Instant::now();
    let res = common::client()
        .get(slow.url("/p/http/host:notaport/x"))
        .send()
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(res.status(), 200);
    let body = res.text().await.unwrap();
    assert!(
        body.starts_with("frontend called http://host:notaport/x and got error return: "),
        "{}",
        body
    );
    slow.shutdown.trigger();
}

#[tokio::test]
async fn test_redirect_is_relayed_not_followed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let backend = common::start_programmable_backend(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        async {
            MockResponse {
                headers: vec![("Location", "http://elsewhere.invalid/next".to_string())],
                ..MockResponse::status("302 Found", "moved")
            }
        }
    })
    .await;
    let tester = common::spawn_tester(TesterConfig::default(), common::identity("frontend")).await;

    let res = common::client()
        .get(tester.url(&format!("/p/http/{}/old", backend)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["location"], "http://elsewhere.invalid/next");
    assert_eq!(res.text().await.unwrap(), "moved");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tester.shutdown.trigger();
}
