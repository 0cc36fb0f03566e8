// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{build_orchestrator, orchestrator_config, FakeResolver, FakeSite};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use axum_test::TestServer;
use contactrs::config::settings::Settings;
use contactrs::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_app() -> axum::Router {
    let site = Arc::new(
        FakeSite::new().page("/", "<html><body>Questions? contact@example.com</body></html>"),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = Arc::new(build_orchestrator(site, resolver, orchestrator_config()));
    routes::app(orchestrator, Arc::new(Settings::default()))
}

fn test_server() -> TestServer {
    TestServer::new(test_app()).unwrap()
}

/// 健康检查测试
#[tokio::test]
async fn health_check_works() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_version_and_cache_size() {
    let server = test_server();

    let body: Value = server.get("/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["cache_entries"], 0);
}

#[tokio::test]
async fn root_reports_service_name() {
    let server = test_server();

    let body: Value = server.get("/").await.json();

    assert_eq!(body["name"], "contactrs");
}

#[tokio::test]
async fn scrape_returns_validated_email() {
    let server = test_server();

    let response = server
        .post("/api/v1/scrape")
        .json(&json!({ "url": "https://www.example.com", "max_pages": 5, "timeout": 10 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["pages_visited"], json!(["/"]));
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["timed_out"], false);
    assert_eq!(body["skipped"], false);
    assert!(body["execution_time"].is_f64());

    let email = &body["emails"][0];
    assert_eq!(email["email"], "contact@example.com");
    assert_eq!(email["mx_valid"], true);
    assert_eq!(email["mx_status"], "valid");
    assert_eq!(email["found_on"], "/");
    assert_eq!(email["mx_records"][0]["preference"], 10);
    assert_eq!(email["mx_records"][0]["exchange"], "mx1.example.com");
}

#[tokio::test]
async fn out_of_range_parameters_are_rejected() {
    let server = test_server();

    let response = server
        .post("/api/v1/scrape")
        .json(&json!({ "url": "example.com", "max_pages": 0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/scrape")
        .json(&json!({ "url": "example.com", "timeout": 1000 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_target_is_bad_request() {
    let server = test_server();

    let response = server
        .post("/api/v1/scrape")
        .json(&json!({ "url": "ftp://example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("scheme"));
}

#[tokio::test]
async fn stats_reflect_mx_cache_usage() {
    let server = test_server();

    for _ in 0..2 {
        server
            .post("/api/v1/scrape")
            .json(&json!({ "url": "example.com" }))
            .await
            .assert_status_ok();
    }

    let stats: Value = server.get("/api/v1/stats").await.json();
    assert_eq!(stats["entries"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["stores"], 1);
}
