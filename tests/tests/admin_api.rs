//! Tests for the admin connection analytics endpoints.

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use integration_tests::fixtures::{
    self, BERLIN_IP, CHROME_DESKTOP, SAFARI_IPHONE, UNLISTED_IP,
};
use integration_tests::setup::TestContext;
use std::io::Write;

/// Admin requests come from a local Chrome desktop.
async fn admin_get(server: &TestServer, path: &str) -> TestResponse {
    server
        .get(path)
        .add_header("Authorization", &fixtures::admin_bearer())
        .add_header("X-Forwarded-For", "127.0.0.1")
        .add_header("User-Agent", CHROME_DESKTOP)
        .await
}

async fn visit(server: &TestServer, path: &str, ip: &str, ua: &str) {
    server
        .get(path)
        .add_header("X-Forwarded-For", ip)
        .add_header("User-Agent", ua)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for path in [
        "/api/admin/connections/active",
        "/api/admin/connections/logs",
        "/api/admin/connections/summary",
    ] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Authorization denied, no token provided");
        assert_eq!(body["code"], "AUTH_001");
    }
}

#[tokio::test]
async fn test_forged_token_is_invalid() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/api/admin/connections/active")
        .add_header("Authorization", &fixtures::forged_bearer())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/api/admin/connections/summary")
        .add_header("Authorization", &fixtures::user_bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Access denied. Admin privileges required.");
}

/// Rejected admin calls are still logged like any other request.
#[tokio::test]
async fn test_rejected_call_is_logged() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/api/admin/connections/active").await;

    let statuses: Vec<u16> = ctx
        .records()
        .iter()
        .filter_map(|r| match r {
            tracker_core::LogRecord::Response(resp) => Some(resp.status_code),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, [401]);
}

#[tokio::test]
async fn test_active_sessions_with_breakdowns() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/", BERLIN_IP, CHROME_DESKTOP).await;
    visit(&server, "/", UNLISTED_IP, SAFARI_IPHONE).await;

    let response = admin_get(&server, "/api/admin/connections/active").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    // The admin's own request opened the third session.
    let stats = &body["stats"];
    assert_eq!(stats["totalSessions"], 3);
    assert_eq!(stats["deviceBreakdown"]["Desktop"], 2);
    assert_eq!(stats["deviceBreakdown"]["Mobile"], 1);
    assert_eq!(stats["browserBreakdown"]["Chrome"], 2);
    assert_eq!(stats["browserBreakdown"]["Safari"], 1);
    assert_eq!(stats["countryBreakdown"]["DE"], 1);
    assert_eq!(stats["countryBreakdown"]["Unknown"], 1);
    assert_eq!(stats["countryBreakdown"]["Local"], 1);

    let sessions = body["sessions"].as_array().expect("sessions array");
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0]["ip"], BERLIN_IP);
    assert_eq!(sessions[0]["requestCount"], 1);
    assert_eq!(sessions[0]["durationMinutes"], 0);
    assert!(sessions[0]["firstSeen"].is_string());
    assert_eq!(sessions[0]["location"]["city"], "Berlin");
}

#[tokio::test]
async fn test_logs_grouped_by_kind() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/api/test", BERLIN_IP, CHROME_DESKTOP).await;

    // The admin request's own new_session and request records are already
    // on disk when the handler reads; its response is not.
    let response = admin_get(&server, "/api/admin/connections/logs").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["total"], 5);
    let grouped = &body["groupedLogs"];
    assert_eq!(grouped["newSessions"].as_array().unwrap().len(), 2);
    assert_eq!(grouped["requests"].as_array().unwrap().len(), 2);
    assert_eq!(grouped["responses"].as_array().unwrap().len(), 1);

    let first_request = &grouped["requests"][0];
    assert_eq!(first_request["type"], "request");
    assert_eq!(first_request["url"], "/api/test");
    assert_eq!(grouped["responses"][0]["statusCode"], 200);
}

#[tokio::test]
async fn test_logs_limit_takes_most_recent() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/api/test", BERLIN_IP, CHROME_DESKTOP).await;

    let response = admin_get(&server, "/api/admin/connections/logs?limit=2").await;
    let body: serde_json::Value = response.json();

    assert_eq!(body["total"], 2);
    let grouped = &body["groupedLogs"];
    assert_eq!(grouped["newSessions"].as_array().unwrap().len(), 1);
    assert_eq!(grouped["requests"][0]["url"], "/api/admin/connections/logs?limit=2");
    assert!(grouped["responses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_logs_bad_limit_uses_default() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/", BERLIN_IP, CHROME_DESKTOP).await;

    let response = admin_get(&server, "/api/admin/connections/logs?limit=abc").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 5);
}

#[tokio::test]
async fn test_corrupt_line_counts_but_is_not_grouped() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/", BERLIN_IP, CHROME_DESKTOP).await;
    ctx.flush_log().await;

    let path = access_log::log_file_path(ctx.logs_dir.path(), access_log::today());
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .expect("log file exists");
    writeln!(file, "{{\"type\":\"request\",").unwrap();

    let response = admin_get(&server, "/api/admin/connections/logs").await;
    let body: serde_json::Value = response.json();

    // 3 from the visit, the corrupt line, 2 from the admin request.
    assert_eq!(body["total"], 6);
    let grouped = &body["groupedLogs"];
    assert_eq!(grouped["requests"].as_array().unwrap().len(), 2);
    assert_eq!(grouped["responses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_incomplete_line_is_grouped_by_type() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/", BERLIN_IP, CHROME_DESKTOP).await;
    ctx.flush_log().await;

    let path = access_log::log_file_path(ctx.logs_dir.path(), access_log::today());
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .expect("log file exists");
    writeln!(file, "{{\"type\":\"request\",\"url\":\"/legacy\"}}").unwrap();

    let response = admin_get(&server, "/api/admin/connections/logs").await;
    let body: serde_json::Value = response.json();

    assert_eq!(body["total"], 6);
    let requests = body["groupedLogs"]["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1]["url"], "/legacy");
    assert!(requests[1].get("error").is_none());
}

#[tokio::test]
async fn test_summary_report() {
    let ctx = TestContext::new();
    let server = ctx.server();

    visit(&server, "/api/test", BERLIN_IP, CHROME_DESKTOP).await;
    visit(&server, "/", UNLISTED_IP, SAFARI_IPHONE).await;
    visit(&server, "/api/test", BERLIN_IP, CHROME_DESKTOP).await;

    let response = admin_get(&server, "/api/admin/connections/summary").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    // Four visitor sessions (no cookies sent) plus the admin's.
    assert_eq!(body["totalSessions"], 4);
    assert_eq!(body["countryBreakdown"]["DE"], 2);

    // 3 visits x 3 records + admin new_session and request.
    assert_eq!(body["sampleSize"], 11);
    assert_eq!(body["totalRequests"], 4);
    assert_eq!(body["uniqueIPs"], 3);
    assert_eq!(body["statusCodes"]["200"], 3);

    let average = body["averageResponseTime"].as_f64().expect("numeric average");
    assert!(average >= 0.0);

    let endpoints = body["popularEndpoints"].as_array().unwrap();
    assert_eq!(endpoints[0]["url"], "/api/test");
    assert_eq!(endpoints[0]["count"], 2);
    // Ties keep first-seen order.
    assert_eq!(endpoints[1]["url"], "/");
    assert_eq!(endpoints[2]["url"], "/api/admin/connections/summary");
}

#[tokio::test]
async fn test_summary_on_empty_log() {
    let ctx = TestContext::new();
    let server = ctx.server();

    // Only the admin request's own new_session and request are on disk.
    let response = admin_get(&server, "/api/admin/connections/summary").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["averageResponseTime"], 0.0);
    assert_eq!(body["statusCodes"], serde_json::json!({}));
}
