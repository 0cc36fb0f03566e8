// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{build_orchestrator, orchestrator_config, FakeResolver, FakeSite};
use contactrs::config::settings::CandidateScope;
use contactrs::domain::dns::resolver::ResolverError;
use contactrs::domain::models::crawl::CrawlRequest;
use contactrs::domain::models::mx::MxStatus;
use contactrs::domain::services::orchestrator::OrchestratorConfig;
use contactrs::utils::errors::CrawlError;
use std::sync::Arc;
use std::time::Duration;

const NO_EMAIL: &str = "<html><body><h1>Welcome</h1><p>Nothing to see here.</p></body></html>";

fn sequential(target: &str, max_pages: usize) -> CrawlRequest {
    CrawlRequest::new(target)
        .with_max_pages(max_pages)
        .with_concurrency(false)
}

/// 根页面即有有效邮箱：只访问根页面
#[tokio::test]
async fn root_page_email_stops_the_crawl() {
    let site = Arc::new(
        FakeSite::new().page("/", "<html><body>Write to contact@example.com</body></html>"),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site.clone(), resolver, orchestrator_config());

    let result = orchestrator
        .crawl(CrawlRequest::new("example.com"))
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.timed_out);
    assert_eq!(result.domain, "example.com");
    assert_eq!(result.pages_visited, vec!["/"]);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.emails.len(), 1);

    let email = &result.emails[0];
    assert_eq!(email.email, "contact@example.com");
    assert_eq!(email.domain, "example.com");
    assert_eq!(email.found_on, "/");
    assert!(email.mx_valid);
    assert_eq!(email.mx_status, MxStatus::Valid);
    assert_eq!(email.mx_records[0].exchange, "mx1.example.com");
    assert_eq!(site.fetched(), vec!["/"]);
}

/// 所有计划页面都没有邮箱
#[tokio::test]
async fn no_email_visits_every_planned_page() {
    let site = Arc::new(FakeSite::new().page("/", NO_EMAIL).page("/contact", NO_EMAIL));
    let resolver = Arc::new(FakeResolver::new());
    let orchestrator = build_orchestrator(site, resolver.clone(), orchestrator_config());

    let result = orchestrator
        .crawl(CrawlRequest::new("https://www.example.com/about").with_max_pages(5))
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.emails.is_empty());
    assert_eq!(
        result.pages_visited,
        vec!["/", "/contact", "/contact-us", "/contactus", "/contact_us"]
    );
    assert_eq!(result.total_pages, 5);
    assert_eq!(resolver.total_calls(), 0);
}

/// 根页面邮箱域名不存在时继续访问联系页面
#[tokio::test]
async fn nxdomain_on_root_continues_to_contact_pages() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", "<p>Old address: old@defunct-example.com</p>")
            .page("/contact", "<p>Reach us: hello@example.com</p>"),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site.clone(), resolver.clone(), orchestrator_config());

    let result = orchestrator.crawl(sequential("example.com", 10)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.pages_visited, vec!["/", "/contact"]);
    assert_eq!(site.fetched(), vec!["/", "/contact"]);
    // 存在已校验地址时只报告已校验地址
    assert_eq!(result.emails.len(), 1);
    assert_eq!(result.emails[0].email, "hello@example.com");
    assert_eq!(result.emails[0].found_on, "/contact");
    assert_eq!(resolver.calls_for("defunct-example.com"), 1);
}

/// 顺序模式：胜出页面之后的页面不会被访问
#[tokio::test]
async fn sequential_mode_never_passes_the_winning_page() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", NO_EMAIL)
            .page("/contact-us", "<a href=\"mailto:sales@example.com\">Sales</a>"),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site.clone(), resolver, orchestrator_config());

    let result = orchestrator.crawl(sequential("example.com", 20)).await.unwrap();

    assert!(result.success);
    assert_eq!(site.fetched(), vec!["/", "/contact", "/contact-us"]);
    assert_eq!(result.pages_visited, vec!["/", "/contact", "/contact-us"]);
    assert_eq!(result.emails[0].found_on, "/contact-us");
}

/// 并发模式：宣布胜出后不再派发新页面
#[tokio::test(start_paused = true)]
async fn concurrent_mode_stops_dispatch_after_winner() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", NO_EMAIL)
            .page("/contact", "<p>hello@example.com</p>")
            .slow_page("/contact-us", NO_EMAIL, Duration::from_secs(1)),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let config = OrchestratorConfig {
        max_concurrency: 2,
        ..orchestrator_config()
    };
    let orchestrator = build_orchestrator(site.clone(), resolver, config);

    let result = orchestrator
        .crawl(CrawlRequest::new("example.com").with_max_pages(20))
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.timed_out);

    let mut fetched = site.fetched();
    fetched.sort();
    assert_eq!(fetched, vec!["/", "/contact", "/contact-us"]);
    // 在途页面完成后仍计入已访问
    assert_eq!(result.pages_visited, vec!["/", "/contact", "/contact-us"]);
}

/// found_on 取计划顺序最早的页面，与完成顺序无关
#[tokio::test(start_paused = true)]
async fn found_on_follows_plan_order_not_completion_order() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", NO_EMAIL)
            .slow_page("/contact", "<p>team@partner.org</p>", Duration::from_secs(2))
            .page("/contact-us", "<p>team@partner.org</p>"),
    );
    let resolver = Arc::new(FakeResolver::new().failing("partner.org", ResolverError::NoRecords));
    let orchestrator = build_orchestrator(site, resolver.clone(), orchestrator_config());

    let result = orchestrator
        .crawl(CrawlRequest::new("example.com").with_max_pages(3))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.pages_visited, vec!["/", "/contact", "/contact-us"]);
    assert_eq!(result.emails.len(), 1);

    let email = &result.emails[0];
    assert_eq!(email.found_on, "/contact");
    assert!(!email.mx_valid);
    assert_eq!(email.mx_status, MxStatus::NoRecords);
    // 第二次校验命中负缓存
    assert_eq!(resolver.calls_for("partner.org"), 1);
}

/// 整体超时：保留已校验邮箱，只列出完成获取的页面
#[tokio::test(start_paused = true)]
async fn timeout_returns_partial_result() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", NO_EMAIL)
            .page("/contact", "<p>sales@example.com</p>")
            .slow_page("/contact-us", NO_EMAIL, Duration::from_secs(60))
            .slow_page("/contactus", NO_EMAIL, Duration::from_secs(60)),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site, resolver, orchestrator_config());

    let result = orchestrator
        .crawl(
            CrawlRequest::new("example.com")
                .with_max_pages(10)
                .with_timeout(Duration::from_secs(5)),
        )
        .await
        .unwrap();

    assert!(result.timed_out);
    assert!(result.success);
    assert_eq!(result.emails.len(), 1);
    assert_eq!(result.emails[0].email, "sales@example.com");
    assert_eq!(result.pages_visited, vec!["/", "/contact"]);
    assert!(result.execution_time >= 5.0);
}

/// 同一进程内重复爬取只查询一次 DNS
#[tokio::test]
async fn mx_cache_is_shared_across_crawls() {
    let site = Arc::new(FakeSite::new().page("/", "<p>contact@example.com</p>"));
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site, resolver.clone(), orchestrator_config());

    let first = orchestrator.crawl(CrawlRequest::new("example.com")).await.unwrap();
    let second = orchestrator.crawl(CrawlRequest::new("example.com")).await.unwrap();

    assert!(first.success && second.success);
    assert_eq!(resolver.calls_for("example.com"), 1);
    assert_eq!(orchestrator.validator().cache().stats().hits, 1);
}

/// 目标域名已缓存为无 MX 时可跳过整个爬取
#[tokio::test]
async fn known_invalid_domain_is_skipped_when_enabled() {
    let site = Arc::new(FakeSite::new().page("/", "<p>info@example.com</p>"));
    let resolver = Arc::new(FakeResolver::new());
    let config = OrchestratorConfig {
        skip_known_invalid_domains: true,
        ..orchestrator_config()
    };
    let orchestrator = build_orchestrator(site.clone(), resolver.clone(), config);

    let first = orchestrator.crawl(sequential("example.com", 1)).await.unwrap();
    assert!(!first.success);
    assert!(!first.skipped);
    assert_eq!(first.emails[0].mx_status, MxStatus::NoRecords);

    let second = orchestrator.crawl(sequential("www.example.com", 5)).await.unwrap();
    assert!(second.skipped);
    assert!(!second.success);
    assert!(second.emails.is_empty());
    assert!(second.pages_visited.is_empty());
    assert_eq!(site.fetched(), vec!["/"]);
    assert_eq!(resolver.calls_for("example.com"), 1);
}

/// 默认策略仍会爬取已知无 MX 的域名
#[tokio::test]
async fn known_invalid_domain_is_crawled_by_default() {
    let site = Arc::new(FakeSite::new().page("/", "<p>info@example.com</p>"));
    let resolver = Arc::new(FakeResolver::new());
    let orchestrator = build_orchestrator(site.clone(), resolver, orchestrator_config());

    orchestrator.crawl(sequential("example.com", 1)).await.unwrap();
    let second = orchestrator.crawl(sequential("example.com", 1)).await.unwrap();

    assert!(!second.skipped);
    assert_eq!(second.pages_visited, vec!["/"]);
    assert_eq!(site.fetched(), vec!["/", "/"]);
}

/// 多种写法的同一地址只报告一次
#[tokio::test]
async fn one_address_in_three_renderings_is_reported_once() {
    let html = r#"<html><body>
        <p>Email info@example.com</p>
        <a href="mailto:info@example.com">Write us</a>
        <p>or info [at] example [dot] com</p>
    </body></html>"#;
    let site = Arc::new(FakeSite::new().page("/", html));
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site, resolver, orchestrator_config());

    let result = orchestrator.crawl(CrawlRequest::new("example.com")).await.unwrap();

    assert_eq!(result.emails.len(), 1);
    assert_eq!(result.emails[0].email, "info@example.com");
}

/// 只有角色地址且策略不计为成功时继续爬取
#[tokio::test]
async fn role_only_address_does_not_win_when_policy_disallows() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", "<p>noreply@example.com</p>")
            .page("/contact", "<p>jane@example.com</p>"),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let config = OrchestratorConfig {
        role_only_counts_as_success: false,
        ..orchestrator_config()
    };
    let orchestrator = build_orchestrator(site.clone(), resolver, config);

    let result = orchestrator.crawl(sequential("example.com", 10)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.pages_visited, vec!["/", "/contact"]);
    let emails: Vec<&str> = result.emails.iter().map(|e| e.email.as_str()).collect();
    assert_eq!(emails, vec!["noreply@example.com", "jane@example.com"]);
    assert!(result.emails[0].is_role);
}

/// 默认策略下角色地址也算成功
#[tokio::test]
async fn role_only_address_wins_by_default() {
    let site = Arc::new(
        FakeSite::new()
            .page("/", "<p>noreply@example.com</p>")
            .page("/contact", "<p>jane@example.com</p>"),
    );
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site.clone(), resolver, orchestrator_config());

    let result = orchestrator.crawl(sequential("example.com", 10)).await.unwrap();

    assert!(result.success);
    assert_eq!(result.pages_visited, vec!["/"]);
}

/// 候选范围过滤在校验之前生效
#[tokio::test]
async fn candidate_scope_filters_before_validation() {
    let html = "<p>Founder: someone@gmail.com</p>";

    let site = Arc::new(FakeSite::new().page("/", html));
    let resolver = Arc::new(FakeResolver::new().valid("gmail.com"));
    let config = OrchestratorConfig {
        candidate_scope: CandidateScope::SameDomain,
        ..orchestrator_config()
    };
    let orchestrator = build_orchestrator(site, resolver.clone(), config);

    let result = orchestrator
        .crawl(CrawlRequest::new("example.com").with_max_pages(1))
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.emails.is_empty());
    assert_eq!(resolver.calls_for("gmail.com"), 0);

    let site = Arc::new(FakeSite::new().page("/", html));
    let resolver = Arc::new(FakeResolver::new().valid("gmail.com"));
    let config = OrchestratorConfig {
        candidate_scope: CandidateScope::SameDomainOrPublic,
        ..orchestrator_config()
    };
    let orchestrator = build_orchestrator(site, resolver, config);

    let result = orchestrator
        .crawl(CrawlRequest::new("example.com").with_max_pages(1))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.emails[0].email, "someone@gmail.com");
}

/// DNS 瞬时失败：报告为无法确认
#[tokio::test]
async fn transient_dns_failure_reports_unconfirmed() {
    let site = Arc::new(FakeSite::new().page("/", "<p>info@example.com</p>"));
    let resolver = Arc::new(FakeResolver::new().failing("example.com", ResolverError::Timeout));
    let orchestrator = build_orchestrator(site, resolver.clone(), orchestrator_config());

    let result = orchestrator
        .crawl(CrawlRequest::new("example.com").with_max_pages(1))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.emails.len(), 1);
    assert_eq!(result.emails[0].mx_status, MxStatus::Unconfirmed);
    assert!(!result.emails[0].mx_valid);
    // 首次查询加一次重试
    assert_eq!(resolver.calls_for("example.com"), 2);
}

/// 非法输入在访问任何页面之前返回错误
#[tokio::test]
async fn invalid_input_fails_before_any_fetch() {
    let site = Arc::new(FakeSite::new().page("/", "<p>contact@example.com</p>"));
    let resolver = Arc::new(FakeResolver::new().valid("example.com"));
    let orchestrator = build_orchestrator(site.clone(), resolver, orchestrator_config());

    let bad_scheme = orchestrator.crawl(CrawlRequest::new("ftp://example.com")).await;
    assert!(matches!(bad_scheme, Err(CrawlError::InvalidInput(_))));

    let zero_pages = orchestrator
        .crawl(CrawlRequest::new("example.com").with_max_pages(0))
        .await;
    assert!(matches!(zero_pages, Err(CrawlError::InvalidInput(_))));

    assert!(site.fetched().is_empty());
}
