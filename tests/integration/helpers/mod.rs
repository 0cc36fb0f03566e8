// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use contactrs::config::settings::CandidateScope;
use contactrs::domain::dns::resolver::{MxResolver, ResolverError};
use contactrs::domain::models::mx::MxRecord;
use contactrs::domain::services::extraction_service::EmailExtractor;
use contactrs::domain::services::mx_validator::{MxValidator, MxValidatorConfig};
use contactrs::domain::services::orchestrator::{CrawlOrchestrator, OrchestratorConfig};
use contactrs::engines::fetcher::PageFetcher;
use contactrs::engines::traits::{EngineError, FetchRequest, FetchResponse, PageEngine};
use contactrs::infrastructure::cache::mx_cache::MxCache;
use contactrs::utils::retry_policy::RetryPolicy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// 按路径返回固定页面的假站点
///
/// 未配置的路径返回 404，记录每次获取的路径
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, (String, Duration)>,
    fetched: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, path: &str, html: &str) -> Self {
        self.pages
            .insert(path.to_string(), (html.to_string(), Duration::ZERO));
        self
    }

    pub fn slow_page(mut self, path: &str, html: &str, delay: Duration) -> Self {
        self.pages.insert(path.to_string(), (html.to_string(), delay));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageEngine for FakeSite {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let url = Url::parse(&request.url).map_err(|e| EngineError::Other(e.to_string()))?;
        let path = url.path().to_string();
        self.fetched.lock().unwrap().push(path.clone());

        let Some((html, delay)) = self.pages.get(&path) else {
            return Err(EngineError::HttpStatus(404));
        };
        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }

        Ok(FetchResponse {
            status_code: 200,
            content: html.clone(),
            content_type: "text/html".to_string(),
            final_url: request.url.clone(),
            response_time_ms: delay.as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "fake-site"
    }
}

/// 按域名返回固定答案的假解析器
///
/// 未配置的域名返回 NXDOMAIN
#[derive(Default)]
pub struct FakeResolver {
    answers: HashMap<String, Result<Vec<MxRecord>, ResolverError>>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(mut self, domain: &str) -> Self {
        self.answers.insert(
            domain.to_string(),
            Ok(vec![MxRecord::new(10, format!("mx1.{}", domain))]),
        );
        self
    }

    pub fn failing(mut self, domain: &str, error: ResolverError) -> Self {
        self.answers.insert(domain.to_string(), Err(error));
        self
    }

    pub fn calls_for(&self, domain: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(domain)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MxResolver for FakeResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolverError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_insert(0) += 1;

        self.answers
            .get(domain)
            .cloned()
            .unwrap_or(Err(ResolverError::NxDomain))
    }

    fn name(&self) -> &'static str {
        "fake-resolver"
    }
}

pub fn validator_config() -> MxValidatorConfig {
    MxValidatorConfig {
        retry: RetryPolicy::dns(Duration::from_millis(1)),
        ..MxValidatorConfig::default()
    }
}

pub fn orchestrator_config() -> OrchestratorConfig {
    OrchestratorConfig {
        page_timeout: Duration::from_secs(30),
        max_concurrency: 3,
        role_only_counts_as_success: true,
        candidate_scope: CandidateScope::Any,
        skip_known_invalid_domains: false,
    }
}

/// 用假站点与假解析器组装编排器
pub fn build_orchestrator(
    site: Arc<FakeSite>,
    resolver: Arc<FakeResolver>,
    config: OrchestratorConfig,
) -> CrawlOrchestrator {
    build_orchestrator_with_engine(site, resolver, config)
}

/// 用任意页面引擎组装编排器（不启用渲染阶段）
pub fn build_orchestrator_with_engine(
    engine: Arc<dyn PageEngine>,
    resolver: Arc<FakeResolver>,
    config: OrchestratorConfig,
) -> CrawlOrchestrator {
    let validator = MxValidator::new(resolver, Arc::new(MxCache::new(100)), validator_config());
    CrawlOrchestrator::new(
        Arc::new(PageFetcher::new(engine, None)),
        Arc::new(EmailExtractor::default()),
        Arc::new(validator),
        config,
    )
}
