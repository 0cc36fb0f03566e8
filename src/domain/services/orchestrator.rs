// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use metrics::{counter, histogram};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::settings::{CandidateScope, Settings};
use crate::domain::models::crawl::{
    CrawlPhase, CrawlRequest, CrawlResult, PagePlan, PlannedPage, ReportedEmail,
};
use crate::domain::models::email::EmailCandidate;
use crate::domain::models::mx::MxCacheEntry;
use crate::domain::services::extraction_service::EmailExtractor;
use crate::domain::services::mx_validator::MxValidator;
use crate::engines::fetcher::PageFetcher;
use crate::utils::errors::CrawlError;
use crate::utils::patterns::is_public_provider;
use crate::utils::url_utils::{is_same_or_subdomain, normalize_target};

/// 编排器配置
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// 单页面时间预算（HTTP 与渲染共用）
    pub page_timeout: Duration,
    /// 并发模式下同时处理的最大页面数
    pub max_concurrency: usize,
    /// 只有角色类地址通过校验时是否算作成功
    pub role_only_counts_as_success: bool,
    /// 参与校验的候选范围
    pub candidate_scope: CandidateScope,
    /// 目标域名已知没有 MX 记录时跳过爬取
    pub skip_known_invalid_domains: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(15),
            max_concurrency: 5,
            role_only_counts_as_success: true,
            candidate_scope: CandidateScope::Any,
            skip_known_invalid_domains: false,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            page_timeout: settings.page_timeout(),
            max_concurrency: settings.crawler.max_concurrency,
            role_only_counts_as_success: settings.policy.role_only_counts_as_success,
            candidate_scope: settings.policy.candidate_scope,
            skip_known_invalid_domains: settings.policy.skip_known_invalid_domains,
        }
    }
}

/// 合并后的邮箱
#[derive(Debug, Clone)]
struct MergedEmail {
    candidate: EmailCandidate,
    /// 产生该地址的最早计划页面
    page_index: usize,
    /// 在该页面候选列表中的位置
    position: usize,
    entry: Arc<MxCacheEntry>,
}

/// 单次爬取的共享状态
///
/// 由根页面处理和所有联系页面 future 共同写入；整体超时后仍可读取已合并的部分。
#[derive(Default)]
struct CrawlState {
    /// 计划索引 -> 路径
    visited: DashMap<usize, String>,
    /// 邮箱 -> 合并结果
    emails: DashMap<String, MergedEmail>,
    winner: AtomicBool,
}

impl CrawlState {
    fn winner_declared(&self) -> bool {
        self.winner.load(Ordering::Acquire)
    }

    fn declare_winner(&self) {
        self.winner.store(true, Ordering::Release);
    }

    fn mark_visited(&self, page: &PlannedPage) {
        self.visited.insert(page.index, page.path.clone());
    }

    /// 合并一个已校验的候选，同一地址保留计划顺序最早的页面
    fn merge(&self, merged: MergedEmail) {
        match self.emails.entry(merged.candidate.email.clone()) {
            Entry::Occupied(mut existing) => {
                let current = existing.get();
                if (merged.page_index, merged.position) < (current.page_index, current.position) {
                    existing.insert(merged);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(merged);
            }
        }
    }
}

/// 爬取编排器
///
/// 先处理根页面，未找到合格邮箱时再处理联系页面（并发或顺序）。
/// 任一页面产生合格的已校验邮箱即宣布胜出，之后不再派发新页面；
/// 整体超时是唯一的强制取消手段，超时时返回已合并的部分结果。
pub struct CrawlOrchestrator {
    fetcher: Arc<PageFetcher>,
    extractor: Arc<EmailExtractor>,
    validator: Arc<MxValidator>,
    config: OrchestratorConfig,
}

impl CrawlOrchestrator {
    /// 创建新的编排器
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面获取器
    /// * `extractor` - 邮箱提取器
    /// * `validator` - MX 校验器（持有进程级缓存）
    /// * `config` - 编排器配置
    pub fn new(
        fetcher: Arc<PageFetcher>,
        extractor: Arc<EmailExtractor>,
        validator: Arc<MxValidator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            validator,
            config,
        }
    }

    pub fn validator(&self) -> &Arc<MxValidator> {
        &self.validator
    }

    /// 执行一次联系邮箱爬取
    ///
    /// # 参数
    ///
    /// * `request` - 爬取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlResult)` - 爬取结果，超时也返回部分结果
    /// * `Err(CrawlError::InvalidInput)` - 目标或页面数不合法，此时不会访问任何页面
    pub async fn crawl(&self, request: CrawlRequest) -> Result<CrawlResult, CrawlError> {
        let started = Instant::now();
        let target = normalize_target(&request.target)?;
        let plan = PagePlan::build(&target, request.max_pages)?;

        let span = info_span!("crawl", crawl_id = %Uuid::new_v4(), domain = %target.domain);
        async move {
            debug!("Crawl phase -> {} ({} pages)", CrawlPhase::Planning, plan.len());
            info!("Starting contact crawl for {}", target.root_url);

            let state = CrawlState::default();
            if self.config.skip_known_invalid_domains
                && self.validator.known_without_mx(&target.domain)
            {
                info!("Domain {} is cached without MX records, skipping", target.domain);
                counter!("crawl_requests_total", "outcome" => "skipped").increment(1);
                let mut result = self.assemble(&state, &target.domain, started, false);
                result.skipped = true;
                return Ok(result);
            }

            let timed_out = tokio::time::timeout(
                request.timeout,
                self.run(&state, &plan, &request, &target.domain),
            )
            .await
            .is_err();

            if timed_out {
                warn!(
                    "Crawl of {} timed out after {:?}, returning partial result",
                    target.domain, request.timeout
                );
            }
            debug!("Crawl phase -> {}", CrawlPhase::Done);

            let result = self.assemble(&state, &target.domain, started, timed_out);
            let outcome = match (result.success, timed_out) {
                (true, _) => "success",
                (false, true) => "timeout",
                (false, false) => "not_found",
            };
            counter!("crawl_requests_total", "outcome" => outcome).increment(1);
            histogram!("crawl_duration_seconds").record(result.execution_time);

            info!(
                "Crawl finished: success={} emails={} pages={} time={:.2}s",
                result.success,
                result.emails.len(),
                result.total_pages,
                result.execution_time
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, state: &CrawlState, plan: &PagePlan, request: &CrawlRequest, domain: &str) {
        debug!("Crawl phase -> {}", CrawlPhase::FetchingRoot);
        self.process_page(state, plan.root(), request.enable_rendering, domain)
            .await;

        if state.winner_declared() {
            info!("Qualifying email found on root page, skipping contact pages");
            return;
        }

        let contact_pages = plan.contact_pages();
        if contact_pages.is_empty() {
            return;
        }

        let limit = if request.concurrent {
            self.config.max_concurrency.max(1)
        } else {
            1
        };
        debug!(
            "Crawl phase -> {} ({} pages, concurrency {})",
            CrawlPhase::FetchingContactPages,
            contact_pages.len(),
            limit
        );

        let mut pending = contact_pages.iter();
        let mut in_flight = FuturesUnordered::new();
        loop {
            while in_flight.len() < limit && !state.winner_declared() {
                match pending.next() {
                    Some(page) => in_flight.push(self.process_page(
                        state,
                        page,
                        request.enable_rendering,
                        domain,
                    )),
                    None => break,
                }
            }

            if in_flight.next().await.is_none() {
                break;
            }
        }

        if state.winner_declared() {
            info!("Qualifying email found, stopped dispatching contact pages");
        }
    }

    /// 获取、提取并校验单个页面
    async fn process_page(
        &self,
        state: &CrawlState,
        page: &PlannedPage,
        allow_render: bool,
        domain: &str,
    ) {
        let result = self
            .fetcher
            .fetch(
                page.url.as_str(),
                &page.path,
                self.config.page_timeout,
                allow_render,
            )
            .await;
        state.mark_visited(page);

        let Some(html) = result.html.as_deref() else {
            return;
        };

        debug!("Crawl phase -> {} ({})", CrawlPhase::Extracting, page.path);
        let candidates: Vec<EmailCandidate> = self
            .extractor
            .extract(html, &page.path)
            .into_iter()
            .filter(|c| self.in_scope(c, domain))
            .collect();
        if candidates.is_empty() {
            return;
        }

        if state.winner_declared() {
            debug!(
                "Discarding {} candidates from {}, winner already declared",
                candidates.len(),
                page.path
            );
            return;
        }

        debug!("Crawl phase -> {} ({})", CrawlPhase::Validating, page.path);
        for (position, (candidate, entry)) in self.validate(candidates).await.into_iter().enumerate()
        {
            if self.qualifies(&candidate, &entry) {
                if !state.winner_declared() {
                    info!("Validated {} on {}", candidate.email, page.path);
                }
                state.declare_winner();
            }
            state.merge(MergedEmail {
                candidate,
                page_index: page.index,
                position,
                entry,
            });
        }
    }

    /// 并发校验候选邮箱涉及的各个不同域名
    async fn validate(
        &self,
        candidates: Vec<EmailCandidate>,
    ) -> Vec<(EmailCandidate, Arc<MxCacheEntry>)> {
        let mut domains: Vec<String> = Vec::new();
        for candidate in &candidates {
            if !domains.contains(&candidate.domain) {
                domains.push(candidate.domain.clone());
            }
        }

        let entries = join_all(domains.iter().map(|d| self.validator.validate(d))).await;
        let by_domain: HashMap<String, Arc<MxCacheEntry>> = domains.into_iter().zip(entries).collect();

        candidates
            .into_iter()
            .filter_map(|c| {
                let entry = by_domain.get(&c.domain)?.clone();
                Some((c, entry))
            })
            .collect()
    }

    fn in_scope(&self, candidate: &EmailCandidate, domain: &str) -> bool {
        let keep = match self.config.candidate_scope {
            CandidateScope::Any => true,
            CandidateScope::SameDomain => is_same_or_subdomain(&candidate.domain, domain),
            CandidateScope::SameDomainOrPublic => {
                is_same_or_subdomain(&candidate.domain, domain)
                    || is_public_provider(&candidate.domain)
            }
        };
        if !keep {
            debug!("Dropping out-of-scope candidate {}", candidate.email);
        }
        keep
    }

    fn qualifies(&self, candidate: &EmailCandidate, entry: &MxCacheEntry) -> bool {
        entry.valid && (!candidate.is_role || self.config.role_only_counts_as_success)
    }

    /// 由共享状态组装最终结果
    ///
    /// 存在已校验邮箱时只报告已校验的地址；否则报告找到但无法确认的候选
    fn assemble(
        &self,
        state: &CrawlState,
        domain: &str,
        started: Instant,
        timed_out: bool,
    ) -> CrawlResult {
        let mut visited: Vec<(usize, String)> = state
            .visited
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        visited.sort_by_key(|(index, _)| *index);
        let pages_visited: Vec<String> = visited.into_iter().map(|(_, path)| path).collect();

        let mut merged: Vec<MergedEmail> = state.emails.iter().map(|e| e.value().clone()).collect();
        merged.sort_by_key(|m| (m.page_index, m.position));

        let success = merged.iter().any(|m| self.qualifies(&m.candidate, &m.entry));
        if merged.iter().any(|m| m.entry.valid) {
            merged.retain(|m| m.entry.valid);
        }

        let emails = merged
            .into_iter()
            .map(|m| ReportedEmail {
                email: m.candidate.email,
                domain: m.candidate.domain,
                mx_valid: m.entry.valid,
                mx_status: m.entry.status,
                found_on: m.candidate.found_on,
                mx_records: m.entry.records.clone(),
                strategy: m.candidate.strategy,
                is_role: m.candidate.is_role,
            })
            .collect();

        CrawlResult {
            success,
            domain: domain.to_string(),
            emails,
            total_pages: pages_visited.len(),
            pages_visited,
            execution_time: started.elapsed().as_secs_f64(),
            timed_out,
            skipped: false,
        }
    }
}
