//! End-to-end tests for per-request connection logging.
//!
//! Requests go through the real router; records are observed through the
//! capturing sink in the order they were appended.

use axum::http::{header::SET_COOKIE, StatusCode};
use axum_test::{TestResponse, TestServer};
use integration_tests::fixtures::{
    self, BERLIN_IP, CHROME_DESKTOP, FIREFOX_DESKTOP, SAFARI_IPHONE, UNLISTED_IP,
};
use integration_tests::setup::TestContext;
use tracker_core::{Browser, Device, LogRecord};

fn set_cookie(response: &TestResponse) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn visit(server: &TestServer, path: &str, ip: &str, ua: &str) -> TestResponse {
    server
        .get(path)
        .add_header("X-Forwarded-For", ip)
        .add_header("User-Agent", ua)
        .await
}

/// A fresh client gets new_session, request, response, then a cookie.
#[tokio::test]
async fn test_fresh_client_logs_three_records_in_order() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = visit(&server, "/api/test", BERLIN_IP, CHROME_DESKTOP).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "API is working!");

    let cookie = set_cookie(&response).expect("Set-Cookie should be present");
    assert!(cookie.contains("HttpOnly"), "cookie should be HTTP-only: {cookie}");
    assert!(cookie.contains("Max-Age=86400"), "cookie should last 24h: {cookie}");
    let session_id = fixtures::session_id_from_set_cookie(&cookie).expect("sessionId cookie");

    let records = ctx.records();
    assert_eq!(records.len(), 3, "records: {records:?}");

    match &records[0] {
        LogRecord::NewSession(r) => {
            assert_eq!(r.session_id, session_id);
            assert_eq!(r.ip, BERLIN_IP);
            assert_eq!(r.browser, Browser::Chrome);
            assert_eq!(r.device, Device::Desktop);
            assert_eq!(r.location.country, "DE");
            assert_eq!(r.location.region, "BE");
            assert_eq!(r.location.city, "Berlin");
            assert_eq!(r.referer, "-");
        }
        other => panic!("expected new_session first, got {other:?}"),
    }

    match &records[1] {
        LogRecord::Request(r) => {
            assert_eq!(r.session_id, session_id);
            assert_eq!(r.method, "GET");
            assert_eq!(r.url, "/api/test");
        }
        other => panic!("expected request second, got {other:?}"),
    }

    match &records[2] {
        LogRecord::Response(r) => {
            assert_eq!(r.session_id, session_id);
            assert_eq!(r.status_code, 200);
            assert!(r.response_time_ms().is_some(), "responseTime {}", r.response_time);
            let decimals = r.response_time.split('.').nth(1).map(str::len);
            assert_eq!(decimals, Some(2), "two decimals: {}", r.response_time);
        }
        other => panic!("expected response third, got {other:?}"),
    }
}

/// A returning client is logged without a new session or cookie.
#[tokio::test]
async fn test_returning_client_reuses_session() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let first = visit(&server, "/", BERLIN_IP, CHROME_DESKTOP).await;
    let cookie = set_cookie(&first).expect("first visit sets a cookie");
    let session_id = fixtures::session_id_from_set_cookie(&cookie).unwrap();
    ctx.clear_captured();

    let second = server
        .get("/api/test")
        .add_header("X-Forwarded-For", UNLISTED_IP)
        .add_header("User-Agent", CHROME_DESKTOP)
        .add_header("Cookie", &format!("sessionId={session_id}"))
        .await;
    second.assert_status_ok();
    assert!(set_cookie(&second).is_none(), "no cookie for a known session");

    let records = ctx.records();
    assert_eq!(records.len(), 2);
    assert!(matches!(records[0], LogRecord::Request(_)));
    assert!(matches!(records[1], LogRecord::Response(_)));
    assert!(records.iter().all(|r| r.session_id() == session_id));

    let session = ctx.state.sessions.get(&session_id).expect("session kept");
    assert_eq!(session.request_count, 2);
    assert_eq!(session.ip, UNLISTED_IP);
    // Location stays as resolved for the first request.
    assert_eq!(session.location.city, "Berlin");
}

/// An identifier the store does not know starts a fresh session.
#[tokio::test]
async fn test_unknown_cookie_starts_new_session() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/")
        .add_header("Cookie", "sessionId=not-a-live-session")
        .add_header("User-Agent", SAFARI_IPHONE)
        .await;

    let cookie = set_cookie(&response).expect("new cookie issued");
    let session_id = fixtures::session_id_from_set_cookie(&cookie).unwrap();
    assert_ne!(session_id, "not-a-live-session");

    let records = ctx.records();
    match &records[0] {
        LogRecord::NewSession(r) => {
            assert_eq!(r.session_id, session_id);
            assert_eq!(r.browser, Browser::Safari);
            assert_eq!(r.device, Device::Mobile);
        }
        other => panic!("expected new_session, got {other:?}"),
    }
}

/// Only the first hop of a forwarded chain is logged.
#[tokio::test]
async fn test_forwarded_chain_keeps_first_hop() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/", "203.0.113.7 , 10.0.0.1", CHROME_DESKTOP).await;

    let records = ctx.records();
    assert!(records.iter().all(|r| r.ip() == BERLIN_IP), "{records:?}");
}

/// Private addresses resolve to Local without a dataset lookup.
#[tokio::test]
async fn test_private_address_is_local() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .get("/")
        .add_header("X-Real-IP", "10.1.2.3")
        .add_header("User-Agent", CHROME_DESKTOP)
        .await;

    match &ctx.records()[0] {
        LogRecord::NewSession(r) => {
            assert_eq!(r.ip, "10.1.2.3");
            assert_eq!(r.location.country, "Local");
        }
        other => panic!("expected new_session, got {other:?}"),
    }
}

/// Addresses the dataset does not know resolve to Unknown.
#[tokio::test]
async fn test_unlisted_address_is_unknown() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/", UNLISTED_IP, CHROME_DESKTOP).await;

    match &ctx.records()[0] {
        LogRecord::NewSession(r) => {
            assert_eq!(r.location.country, "Unknown");
            assert_eq!(r.location.city, "Unknown");
        }
        other => panic!("expected new_session, got {other:?}"),
    }
}

/// Unmatched paths are logged with their status; the query string is kept.
#[tokio::test]
async fn test_not_found_is_logged() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = visit(&server, "/missing?page=2", UNLISTED_IP, CHROME_DESKTOP).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let records = ctx.records();
    match (&records[1], &records[2]) {
        (LogRecord::Request(req), LogRecord::Response(resp)) => {
            assert_eq!(req.url, "/missing?page=2");
            assert_eq!(resp.url, "/missing?page=2");
            assert_eq!(resp.status_code, 404);
        }
        other => panic!("unexpected records {other:?}"),
    }
}

/// Referer (or Referrer) is carried on request and new_session records.
#[tokio::test]
async fn test_referer_recorded() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .get("/")
        .add_header("User-Agent", FIREFOX_DESKTOP)
        .add_header("Referrer", "https://news.example/")
        .await;

    let records = ctx.records();
    match (&records[0], &records[1]) {
        (LogRecord::NewSession(ns), LogRecord::Request(req)) => {
            assert_eq!(ns.referer, "https://news.example/");
            assert_eq!(req.referer, "https://news.example/");
            assert_eq!(req.browser, Browser::Firefox);
        }
        other => panic!("unexpected records {other:?}"),
    }
}

/// Records also land in the day's log file.
#[tokio::test]
async fn test_records_written_to_daily_file() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/api/test", BERLIN_IP, CHROME_DESKTOP).await;
    ctx.flush_log().await;

    let path = access_log::log_file_path(ctx.logs_dir.path(), access_log::today());
    let content = std::fs::read_to_string(&path).expect("log file written");
    let kinds: Vec<String> = content
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["type"].as_str().unwrap().to_string()
        })
        .collect();

    assert_eq!(kinds, ["new_session", "request", "response"]);
}
