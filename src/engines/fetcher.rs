// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::models::page::{FetchOutcome, FetchStage, PageResult};
use crate::engines::content_signals::needs_rendering;
use crate::engines::traits::{EngineError, FetchRequest, PageEngine};

/// 页面获取器
///
/// 两阶段流水线：先走HTTP，响应缺少可提取内容迹象时提升到渲染阶段。
/// 两个阶段共用一个单页面时间预算，获取失败只记录在结果中，从不返回错误。
pub struct PageFetcher {
    http: Arc<dyn PageEngine>,
    renderer: Option<Arc<dyn PageEngine>>,
}

impl PageFetcher {
    /// 创建页面获取器
    ///
    /// # 参数
    ///
    /// * `http` - HTTP 阶段引擎
    /// * `renderer` - 渲染阶段引擎，`None` 表示不支持渲染
    pub fn new(http: Arc<dyn PageEngine>, renderer: Option<Arc<dyn PageEngine>>) -> Self {
        Self { http, renderer }
    }

    /// 获取单个页面
    ///
    /// # 参数
    ///
    /// * `url` - 完整URL
    /// * `path` - 页面计划中的路径
    /// * `budget` - 单页面时间预算，HTTP 与渲染共用
    /// * `allow_render` - 本次请求是否允许渲染
    ///
    /// # 返回值
    ///
    /// 页面结果，失败原因记录在 `outcome` 中
    pub async fn fetch(
        &self,
        url: &str,
        path: &str,
        budget: Duration,
        allow_render: bool,
    ) -> PageResult {
        let deadline = Instant::now() + budget;
        let result = self.run_pipeline(url, path, budget, deadline, allow_render).await;

        counter!("crawl_pages_fetched_total", "outcome" => result.outcome.label()).increment(1);
        match &result.outcome {
            FetchOutcome::Success => debug!(
                "Fetched {} via {}",
                url,
                result.stage.map(|s| s.to_string()).unwrap_or_default()
            ),
            outcome => warn!("Failed to fetch {}: {}", url, outcome),
        }
        result
    }

    async fn run_pipeline(
        &self,
        url: &str,
        path: &str,
        budget: Duration,
        deadline: Instant,
        allow_render: bool,
    ) -> PageResult {
        let request = FetchRequest {
            url: url.to_string(),
            timeout: budget,
        };

        let response = match tokio::time::timeout_at(deadline, self.http.fetch(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!("{} engine failed for {}: {}", self.http.name(), url, e);
                return PageResult::failure(url, path, outcome_for(e));
            }
            Err(_) => return PageResult::failure(url, path, FetchOutcome::Timeout),
        };

        let renderer = match &self.renderer {
            Some(renderer) if allow_render && needs_rendering(&response.content) => renderer,
            _ => return PageResult::success(url, path, FetchStage::Http, response.content),
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return PageResult::failure(
                url,
                path,
                FetchOutcome::RenderError("page budget exhausted before render".to_string()),
            );
        }

        debug!(
            "Promoting {} from {} to {} ({:?} left)",
            url,
            self.http.name(),
            renderer.name(),
            remaining
        );
        let render_request = FetchRequest {
            url: url.to_string(),
            timeout: remaining,
        };

        match tokio::time::timeout_at(deadline, renderer.fetch(&render_request)).await {
            Ok(Ok(rendered)) => PageResult::success(url, path, FetchStage::Render, rendered.content),
            Ok(Err(e)) => PageResult::failure(url, path, FetchOutcome::RenderError(e.to_string())),
            Err(_) => PageResult::failure(
                url,
                path,
                FetchOutcome::RenderError("render timed out".to_string()),
            ),
        }
    }
}

fn outcome_for(error: EngineError) -> FetchOutcome {
    match error {
        EngineError::HttpStatus(status) => FetchOutcome::HttpError(status),
        EngineError::Timeout => FetchOutcome::Timeout,
        EngineError::RequestFailed(e) if e.is_timeout() => FetchOutcome::Timeout,
        EngineError::RequestFailed(e) => FetchOutcome::NetworkError(e.to_string()),
        EngineError::Render(message) => FetchOutcome::RenderError(message),
        EngineError::Other(message) => FetchOutcome::NetworkError(message),
    }
}
