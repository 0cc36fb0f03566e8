// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::crawl::{CrawlResult, ReportedEmail};

/// 联系邮箱爬取响应数据传输对象
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponseDto {
    /// 是否找到合格的已校验邮箱
    pub success: bool,
    /// 爬取的裸域名
    pub domain: String,
    /// 报告的邮箱
    pub emails: Vec<ReportedEmail>,
    /// 已访问页面路径
    pub pages_visited: Vec<String>,
    /// 已访问页面总数
    pub total_pages: usize,
    /// 总耗时（秒）
    pub execution_time: f64,
    /// 是否因整体超时提前结束
    pub timed_out: bool,
    /// 目标域名已知没有 MX 记录而未爬取
    pub skipped: bool,
}

impl From<CrawlResult> for ContactResponseDto {
    fn from(result: CrawlResult) -> Self {
        Self {
            success: result.success,
            domain: result.domain,
            emails: result.emails,
            pages_visited: result.pages_visited,
            total_pages: result.total_pages,
            execution_time: result.execution_time,
            timed_out: result.timed_out,
            skipped: result.skipped,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub version: String,
    /// 当前 MX 缓存条目数
    pub cache_entries: usize,
}
