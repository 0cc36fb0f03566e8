// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::domain::models::email::StrategyKind;
use crate::domain::models::mx::{MxRecord, MxStatus};
use crate::utils::errors::CrawlError;
use crate::utils::patterns::CONTACT_PAGES;
use crate::utils::url_utils::{build_page_url, NormalizedTarget};

/// 联系邮箱爬取请求
///
/// 接受后不再修改
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// 目标URL或域名
    pub target: String,
    /// 最多访问的页面数（包含根页面）
    pub max_pages: usize,
    /// 整体超时时间
    pub timeout: Duration,
    /// 是否允许浏览器渲染
    pub enable_rendering: bool,
    /// 联系页面阶段是否并发获取
    pub concurrent: bool,
}

impl CrawlRequest {
    /// 使用默认参数创建请求（50 页，30 秒，启用渲染与并发）
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            max_pages: 50,
            timeout: Duration::from_secs(30),
            enable_rendering: true,
            concurrent: true,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rendering(mut self, enable_rendering: bool) -> Self {
        self.enable_rendering = enable_rendering;
        self
    }

    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }
}

/// 计划访问的单个页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPage {
    /// 在计划中的位置，根页面为 0
    pub index: usize,
    /// 相对根URL的路径
    pub path: String,
    /// 完整URL
    pub url: Url,
}

/// 页面访问计划
///
/// 根页面在前，随后是按优先级排列的固定候选路径，截断到最大页面数
#[derive(Debug, Clone)]
pub struct PagePlan {
    pages: Vec<PlannedPage>,
}

impl PagePlan {
    /// 为规范化后的目标构建访问计划
    ///
    /// # 参数
    ///
    /// * `target` - 规范化后的目标
    /// * `max_pages` - 最大页面数，必须大于 0
    ///
    /// # 返回值
    ///
    /// * `Ok(PagePlan)` - 访问计划
    /// * `Err(CrawlError::InvalidInput)` - 最大页面数为 0
    pub fn build(target: &NormalizedTarget, max_pages: usize) -> Result<Self, CrawlError> {
        if max_pages == 0 {
            return Err(CrawlError::InvalidInput(
                "max_pages must be at least 1".to_string(),
            ));
        }

        let pages = std::iter::once("/")
            .chain(CONTACT_PAGES.iter().copied())
            .take(max_pages)
            .enumerate()
            .map(|(index, path)| {
                Ok(PlannedPage {
                    index,
                    path: path.to_string(),
                    url: build_page_url(&target.root_url, path)?,
                })
            })
            .collect::<Result<Vec<_>, CrawlError>>()?;

        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[PlannedPage] {
        &self.pages
    }

    pub fn root(&self) -> &PlannedPage {
        // build 保证至少有根页面
        &self.pages[0]
    }

    /// 根页面之后的候选页面
    pub fn contact_pages(&self) -> &[PlannedPage] {
        &self.pages[1..]
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// 编排状态
///
/// 状态转换遵循以下流程：
/// Planning → FetchingRoot → Extracting → Validating →
/// (Done | FetchingContactPages → Extracting → Validating → Done)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Planning,
    FetchingRoot,
    Extracting,
    Validating,
    FetchingContactPages,
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CrawlPhase::Planning => write!(f, "planning"),
            CrawlPhase::FetchingRoot => write!(f, "fetching_root"),
            CrawlPhase::Extracting => write!(f, "extracting"),
            CrawlPhase::Validating => write!(f, "validating"),
            CrawlPhase::FetchingContactPages => write!(f, "fetching_contact_pages"),
            CrawlPhase::Done => write!(f, "done"),
        }
    }
}

/// 结果中报告的邮箱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedEmail {
    /// 邮箱地址
    pub email: String,
    /// 邮箱域名
    pub domain: String,
    /// MX 是否有效
    pub mx_valid: bool,
    /// MX 校验状态
    pub mx_status: MxStatus,
    /// 最早发现该地址的页面路径（按计划顺序）
    pub found_on: String,
    /// MX 记录
    pub mx_records: Vec<MxRecord>,
    /// 首次产生该地址的提取策略
    pub strategy: StrategyKind,
    /// 是否为角色类地址
    pub is_role: bool,
}

/// 爬取最终结果
///
/// 构造后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// 是否找到至少一个通过校验的邮箱
    pub success: bool,
    /// 爬取的裸域名
    pub domain: String,
    /// 报告的邮箱，按发现的计划顺序排列
    pub emails: Vec<ReportedEmail>,
    /// 已完成获取的页面路径，按计划顺序排列
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
