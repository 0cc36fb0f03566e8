// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::patterns::{is_role_local_part, ASSET_EXTENSIONS};

/// 邮箱地址最大长度（RFC 5321 路径限制）
const MAX_EMAIL_LEN: usize = 254;
/// 本地部分最大长度
const MAX_LOCAL_LEN: usize = 64;
/// 域名标签最大长度
const MAX_LABEL_LEN: usize = 63;

/// 提取策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 纯文本正则匹配
    PlainText,
    /// mailto 链接与联系人微格式
    Markup,
    /// 反混淆后匹配
    Obfuscation,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StrategyKind::PlainText => write!(f, "plain_text"),
            StrategyKind::Markup => write!(f, "markup"),
            StrategyKind::Obfuscation => write!(f, "obfuscation"),
        }
    }
}

/// 候选邮箱
///
/// 以小写后的完整地址去重，保留首次发现的页面与策略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCandidate {
    /// 小写规范化后的邮箱地址
    pub email: String,
    /// 本地部分
    pub local_part: String,
    /// 域名部分
    pub domain: String,
    /// 发现该地址的页面路径
    pub found_on: String,
    /// 产生该地址的提取策略
    pub strategy: StrategyKind,
    /// 是否为角色类地址（noreply、postmaster 等）
    pub is_role: bool,
}

impl EmailCandidate {
    /// 从原始字符串构建候选邮箱
    ///
    /// 不满足结构语法的字符串返回 `None`。
    pub fn parse(raw: &str, found_on: &str, strategy: StrategyKind) -> Option<Self> {
        let (local_part, domain) = parse_email(raw)?;
        Some(Self {
            email: format!("{}@{}", local_part, domain),
            is_role: is_role_local_part(&local_part),
            local_part,
            domain,
            found_on: found_on.to_string(),
            strategy,
        })
    }
}

/// 按结构语法校验并规范化邮箱
///
/// # 返回值
///
/// 合法时返回小写的 `(本地部分, 域名)`，否则返回 `None`
pub fn parse_email(raw: &str) -> Option<(String, String)> {
    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return None;
    }

    let (local, domain) = email.split_once('@')?;
    if domain.contains('@') {
        return None;
    }

    if !is_valid_local_part(local) || !is_valid_domain(domain) {
        return None;
    }

    Some((local.to_string(), domain.to_string()))
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    // labels 至少有两个元素
    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()) && !ASSET_EXTENSIONS.contains(&tld)
}
