// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{build_orchestrator_with_engine, orchestrator_config, FakeResolver, FakeSite};
use contactrs::domain::models::crawl::CrawlRequest;
use contactrs::domain::models::page::{FetchOutcome, FetchStage};
use contactrs::engines::fetcher::PageFetcher;
use contactrs::engines::reqwest_engine::ReqwestEngine;
use contactrs::engines::traits::PageEngine;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn http_engine() -> Arc<dyn PageEngine> {
    Arc::new(ReqwestEngine::new("contactrs-test").unwrap())
}

#[tokio::test]
async fn http_stage_returns_static_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(html("<html><body><p>support@example.com</p></body></html>"))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(http_engine(), None);
    let page = fetcher
        .fetch(
            &format!("{}/contact", server.uri()),
            "/contact",
            Duration::from_secs(5),
            true,
        )
        .await;

    assert_eq!(page.outcome, FetchOutcome::Success);
    assert_eq!(page.stage, Some(FetchStage::Http));
    assert!(page.html.unwrap().contains("support@example.com"));
}

#[tokio::test]
async fn missing_page_is_an_http_error() {
    let server = MockServer::start().await;

    let fetcher = PageFetcher::new(http_engine(), None);
    let page = fetcher
        .fetch(
            &format!("{}/support", server.uri()),
            "/support",
            Duration::from_secs(5),
            true,
        )
        .await;

    assert_eq!(page.outcome, FetchOutcome::HttpError(404));
    assert!(page.html.is_none());
}

#[tokio::test]
async fn slow_server_exceeds_page_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>late@example.com</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(http_engine(), None);
    let page = fetcher
        .fetch(
            &format!("{}/", server.uri()),
            "/",
            Duration::from_millis(300),
            true,
        )
        .await;

    assert_eq!(page.outcome, FetchOutcome::Timeout);
}

#[tokio::test]
async fn script_shell_is_promoted_to_render_stage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><div id="app"></div><script src="/bundle.js"></script></body></html>"#,
        ))
        .mount(&server)
        .await;

    // 渲染阶段由假站点代替浏览器
    let renderer = Arc::new(FakeSite::new().page("/", "<p>hello@example.com</p>"));
    let fetcher = PageFetcher::new(
        http_engine(),
        Some(renderer.clone() as Arc<dyn PageEngine>),
    );

    let page = fetcher
        .fetch(
            &format!("{}/", server.uri()),
            "/",
            Duration::from_secs(5),
            true,
        )
        .await;

    assert_eq!(page.stage, Some(FetchStage::Render));
    assert_eq!(page.html.as_deref(), Some("<p>hello@example.com</p>"));
    assert_eq!(renderer.fetched(), vec!["/"]);
}

/// 通过真实 HTTP 栈完成一次完整爬取
#[tokio::test]
async fn crawl_over_http_finds_contact_page_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body><h1>Acme</h1></body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(html(
            r#"<html><body><a href="mailto:hello@example.com?subject=Hi">Email us</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator_with_engine(http_engine(), resolver, orchestrator_config());

    let result = orchestrator
        .crawl(
            CrawlRequest::new(server.uri())
                .with_max_pages(10)
                .with_concurrency(false),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.domain, "127.0.0.1");
    assert_eq!(result.pages_visited, vec!["/", "/contact"]);
    assert_eq!(result.emails[0].email, "hello@example.com");
    assert_eq!(result.emails[0].found_on, "/contact");
}
