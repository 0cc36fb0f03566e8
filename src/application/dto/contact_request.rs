// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::config::settings::Settings;
use crate::domain::models::crawl::CrawlRequest;

/// 联系邮箱爬取请求数据传输对象
///
/// `url` 可以是完整URL，也可以是裸域名，结构校验由规范化步骤完成
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ContactRequestDto {
    /// 目标URL或域名
    #[validate(length(min = 1, max = 2048, message = "url cannot be empty"))]
    pub url: String,
    /// 最多访问的页面数
    #[validate(range(min = 1, max = 100))]
    pub max_pages: Option<usize>,
    /// 整体超时时间（秒）
    #[validate(range(min = 5, max = 300))]
    pub timeout: Option<u64>,
}

impl ContactRequestDto {
    /// 结合进程配置转换为领域请求
    ///
    /// 页面数同时受 `crawler.max_pages_limit` 限制
    pub fn into_crawl_request(self, settings: &Settings) -> CrawlRequest {
        let max_pages = self
            .max_pages
            .unwrap_or(settings.crawler.default_max_pages)
            .min(settings.crawler.max_pages_limit);
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| settings.default_timeout());

        CrawlRequest::new(self.url)
            .with_max_pages(max_pages)
            .with_timeout(timeout)
            .with_rendering(settings.crawler.enable_rendering)
            .with_concurrency(settings.crawler.concurrent)
    }
}
