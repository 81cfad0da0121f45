//! Tests for health check endpoints.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;
use tracker_core::GeoResolver;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();

    for field in [
        "status",
        "accessLogWritable",
        "geoipLoaded",
        "activeSessions",
        "components",
        "metrics",
    ] {
        assert!(
            body.get(field).is_some(),
            "Response should have '{}' field",
            field
        );
    }

    let components: Vec<&str> = body["components"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(components, ["access_log", "geoip"]);
}

/// The access log in the temp dir is writable and the static geo table loaded.
#[tokio::test]
async fn test_health_reports_components() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body: serde_json::Value = server.get("/health").await.json();

    assert_eq!(body["accessLogWritable"], true);
    assert_eq!(body["geoipLoaded"], true);

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "degraded",
        "Status should be 'healthy' or 'degraded', got '{}'",
        status
    );
}

#[tokio::test]
async fn test_health_without_geo_dataset() {
    let ctx = TestContext::with_geo(GeoResolver::disabled());
    let server = ctx.server();

    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["geoipLoaded"], false);
}

/// The health probe itself goes through the connection logger.
#[tokio::test]
async fn test_health_counts_its_own_session() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body: serde_json::Value = server.get("/health").await.json();

    assert_eq!(body["activeSessions"], 1);
    assert!(body["metrics"]["requests_logged"].as_u64().unwrap() >= 1);
}

/// Test /health/ready endpoint
#[tokio::test]
async fn test_ready_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

/// Test /health/live endpoint always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health/live").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_root_welcome() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Welcome to PoliQ Backend API");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for path in ["/", "/api/admin/connections/active", "/missing"] {
        let response = server.get(path).await;
        let headers = response.headers();

        assert_eq!(headers["x-content-type-options"], "nosniff", "{path}");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN", "{path}");
        assert_eq!(headers["referrer-policy"], "no-referrer", "{path}");
    }
}
