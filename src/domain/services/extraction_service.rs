// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use tracing::debug;

use crate::domain::models::email::EmailCandidate;
use crate::domain::services::extraction_strategies::{
    ExtractionStrategy, MarkupStrategy, ObfuscationStrategy, PageDocument, PlainTextStrategy,
};

/// 邮箱提取服务
///
/// 按顺序合并多个提取策略的结果：
/// 以小写地址去重并保留首个策略，角色类地址稳定地排到末尾。
pub struct EmailExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PlainTextStrategy),
            Box::new(MarkupStrategy),
            Box::new(ObfuscationStrategy),
        ])
    }
}

impl EmailExtractor {
    /// 使用指定的策略列表创建提取器
    ///
    /// # 参数
    ///
    /// * `strategies` - 提取策略，列表顺序决定去重时保留哪个策略
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// 从页面HTML中提取候选邮箱
    ///
    /// # 参数
    ///
    /// * `html` - 页面HTML
    /// * `page_path` - 页面路径，记录在候选的 `found_on` 中
    ///
    /// # 返回值
    ///
    /// 去重后的候选列表，非角色地址在前
    pub fn extract(&self, html: &str, page_path: &str) -> Vec<EmailCandidate> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let page = PageDocument::parse(html);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            for raw in strategy.extract(&page) {
                let Some(candidate) = EmailCandidate::parse(&raw, page_path, kind) else {
                    continue;
                };
                if seen.insert(candidate.email.clone()) {
                    candidates.push(candidate);
                }
            }
        }

        // sort_by_key 是稳定排序，同组内保持发现顺序
        candidates.sort_by_key(|c| c.is_role);

        debug!(
            "Extracted {} candidate emails from {}",
            candidates.len(),
            page_path
        );
        candidates
    }
}
