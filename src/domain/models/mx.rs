// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// MX 记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    /// 优先级，数值越小越优先
    pub preference: u16,
    /// 邮件交换主机名（不含末尾的点）
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 空 MX（交换主机为根域 `.`）或空主机名
    pub fn is_null(&self) -> bool {
        let exchange = self.exchange.trim();
        exchange.is_empty() || exchange == "."
    }
}

/// MX 校验状态
///
/// 状态转换：
/// 查询成功且有可用记录 → Valid；
/// NXDOMAIN 或无记录 → NoRecords；
/// 重试后仍为瞬时失败 → Unconfirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MxStatus {
    /// 存在可用 MX 记录
    Valid,
    /// 域名不存在或没有 MX 记录
    #[serde(rename = "no_mx")]
    NoRecords,
    /// DNS 瞬时失败，无法确认
    Unconfirmed,
}

impl fmt::Display for MxStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MxStatus::Valid => write!(f, "valid"),
            MxStatus::NoRecords => write!(f, "no_mx"),
            MxStatus::Unconfirmed => write!(f, "unconfirmed"),
        }
    }
}

/// MX 缓存条目
///
/// 写入后不可变，过期后不再返回。
#[derive(Debug, Clone)]
pub struct MxCacheEntry {
    /// 小写域名
    pub domain: String,
    /// 是否有效
    pub valid: bool,
    /// 校验状态
    pub status: MxStatus,
    /// 按优先级排序的 MX 记录
    pub records: Vec<MxRecord>,
    /// 写入时间
    pub cached_at: DateTime<Utc>,
    /// 过期时刻
    pub expires_at: Instant,
}

impl MxCacheEntry {
    /// 创建新的缓存条目，`valid` 由状态推导
    pub fn new(domain: &str, status: MxStatus, mut records: Vec<MxRecord>, ttl: Duration) -> Self {
        records.sort_by_key(|r| r.preference);
        Self {
            domain: domain.to_string(),
            valid: status == MxStatus::Valid,
            status,
            records,
            cached_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
