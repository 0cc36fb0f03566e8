// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::fmt;

use crate::domain::models::email::EmailCandidate;

/// 页面获取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// 成功获取HTML
    Success,
    /// 非 2xx 状态码
    HttpError(u16),
    /// 超出单页面时间预算
    Timeout,
    /// 连接、TLS 等传输层失败
    NetworkError(String),
    /// 浏览器渲染失败
    RenderError(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success)
    }

    /// 用于指标标签的短名称
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Success => "success",
            FetchOutcome::HttpError(_) => "http_error",
            FetchOutcome::Timeout => "timeout",
            FetchOutcome::NetworkError(_) => "network_error",
            FetchOutcome::RenderError(_) => "render_error",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchOutcome::Success => write!(f, "success"),
            FetchOutcome::HttpError(status) => write!(f, "http error {}", status),
            FetchOutcome::Timeout => write!(f, "timeout"),
            FetchOutcome::NetworkError(e) => write!(f, "network error: {}", e),
            FetchOutcome::RenderError(e) => write!(f, "render error: {}", e),
        }
    }
}

/// 产生最终HTML的获取阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    /// 直接HTTP请求
    Http,
    /// 浏览器渲染
    Render,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchStage::Http => write!(f, "http"),
            FetchStage::Render => write!(f, "render"),
        }
    }
}

/// 单个页面的访问结果
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    /// 访问的完整URL
    pub url: String,
    /// 页面计划中的路径
    pub path: String,
    /// 获取结果
    pub outcome: FetchOutcome,
    /// 产生HTML的阶段，失败时为 `None`
    pub stage: Option<FetchStage>,
    /// 原始HTML，仅成功时存在
    #[serde(skip)]
    pub html: Option<String>,
    /// 从页面中提取出的候选邮箱
    pub candidates: Vec<EmailCandidate>,
}

impl PageResult {
    /// 成功获取的页面
    pub fn success(url: &str, path: &str, stage: FetchStage, html: String) -> Self {
        Self {
            url: url.to_string(),
            path: path.to_string(),
            outcome: FetchOutcome::Success,
            stage: Some(stage),
            html: Some(html),
            candidates: Vec::new(),
        }
    }

    /// 获取失败的页面
    pub fn failure(url: &str, path: &str, outcome: FetchOutcome) -> Self {
        Self {
            url: url.to_string(),
            path: path.to_string(),
            outcome,
            stage: None,
            html: None,
            candidates: Vec::new(),
        }
    }
}
