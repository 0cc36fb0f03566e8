// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::application::dto::contact_request::ContactRequestDto;
use crate::application::dto::contact_response::{ContactResponseDto, HealthResponseDto};
use crate::config::settings::Settings;
use crate::domain::services::orchestrator::CrawlOrchestrator;
use crate::infrastructure::cache::mx_cache::CacheStats;
use crate::presentation::errors::AppError;

/// 联系邮箱爬取处理器
///
/// 请求参数校验失败或目标无法规范化时返回 400；
/// 超时不视为错误，返回 `timed_out = true` 的部分结果
pub async fn scrape(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<ContactRequestDto>,
) -> Result<Json<ContactResponseDto>, AppError> {
    payload.validate()?;
    info!("Received contact scrape request for {}", payload.url);

    let request = payload.into_crawl_request(&settings);
    let result = orchestrator.crawl(request).await?;

    Ok(Json(result.into()))
}

/// MX 缓存统计
pub async fn stats(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
) -> Json<CacheStats> {
    Json(orchestrator.validator().cache().stats())
}

/// 健康检查端点
pub async fn health(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
) -> Json<HealthResponseDto> {
    Json(HealthResponseDto {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_entries: orchestrator.validator().cache().len(),
    })
}
