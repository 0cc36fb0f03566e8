// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::settings::Settings;
use crate::domain::dns::resolver::{MxResolver, ResolverError};
use crate::domain::models::mx::{MxCacheEntry, MxRecord, MxStatus};
use crate::infrastructure::cache::mx_cache::MxCache;
use crate::utils::retry_policy::RetryPolicy;

/// MX 校验器配置
#[derive(Debug, Clone)]
pub struct MxValidatorConfig {
    /// 单次查询超时时间
    pub query_timeout: Duration,
    /// 有效结果缓存时间
    pub positive_ttl: Duration,
    /// 无 MX 结果缓存时间
    pub negative_ttl: Duration,
    /// 无法确认结果缓存时间
    pub unconfirmed_ttl: Duration,
    /// 瞬时失败重试策略
    pub retry: RetryPolicy,
}

impl Default for MxValidatorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            positive_ttl: Duration::from_secs(24 * 60 * 60),
            negative_ttl: Duration::from_secs(60 * 60),
            unconfirmed_ttl: Duration::from_secs(5 * 60),
            retry: RetryPolicy::dns(Duration::from_millis(250)),
        }
    }
}

impl MxValidatorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            query_timeout: Duration::from_millis(settings.dns.query_timeout_ms),
            positive_ttl: Duration::from_secs(settings.cache.positive_ttl_secs),
            negative_ttl: Duration::from_secs(settings.cache.negative_ttl_secs),
            unconfirmed_ttl: Duration::from_secs(settings.cache.unconfirmed_ttl_secs),
            retry: RetryPolicy::dns(Duration::from_millis(settings.dns.retry_backoff_ms)),
        }
    }

    fn ttl_for(&self, status: MxStatus) -> Duration {
        match status {
            MxStatus::Valid => self.positive_ttl,
            MxStatus::NoRecords => self.negative_ttl,
            MxStatus::Unconfirmed => self.unconfirmed_ttl,
        }
    }
}

/// MX 校验服务
///
/// 先查缓存，未命中时查询 DNS。三种结果（有效、无 MX、无法确认）都会写入缓存，
/// 各自使用不同的 TTL。并发校验同一域名时可能各查询一次，缓存后写者覆盖。
pub struct MxValidator {
    resolver: Arc<dyn MxResolver>,
    cache: Arc<MxCache>,
    config: MxValidatorConfig,
}

impl MxValidator {
    /// 创建新的 MX 校验器
    ///
    /// # 参数
    ///
    /// * `resolver` - MX 解析器
    /// * `cache` - 进程级 MX 缓存
    /// * `config` - 超时、TTL 与重试配置
    pub fn new(resolver: Arc<dyn MxResolver>, cache: Arc<MxCache>, config: MxValidatorConfig) -> Self {
        Self {
            resolver,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<MxCache> {
        &self.cache
    }

    /// 校验域名的 MX 记录
    ///
    /// # 参数
    ///
    /// * `domain` - 域名，不区分大小写，末尾的点会被忽略
    ///
    /// # 返回值
    ///
    /// 缓存条目；缓存命中时返回同一个 `Arc`
    pub async fn validate(&self, domain: &str) -> Arc<MxCacheEntry> {
        let key = MxCache::cache_key(domain);
        if let Some(entry) = self.cache.get(&key) {
            return entry;
        }

        let (status, records) = self.query_with_retry(&key).await;
        counter!("mx_lookups_total", "status" => status.to_string()).increment(1);
        debug!(
            "MX lookup for {} via {} finished: {} ({} records)",
            key,
            self.resolver.name(),
            status,
            records.len()
        );

        self.cache.put(MxCacheEntry::new(
            &key,
            status,
            records,
            self.config.ttl_for(status),
        ))
    }

    /// 缓存中是否已记录该域名没有 MX 记录
    ///
    /// 只读取缓存，不发起DNS查询
    pub fn known_without_mx(&self, domain: &str) -> bool {
        self.cache
            .peek(domain)
            .is_some_and(|entry| entry.status == MxStatus::NoRecords)
    }

    /// 校验邮箱地址所属域名
    ///
    /// 地址不含 `@` 时返回 `None`
    pub async fn validate_email(&self, email: &str) -> Option<Arc<MxCacheEntry>> {
        let (_, domain) = email.rsplit_once('@')?;
        if domain.is_empty() {
            return None;
        }
        Some(self.validate(domain).await)
    }

    async fn query_with_retry(&self, domain: &str) -> (MxStatus, Vec<MxRecord>) {
        let mut attempt = 0;
        loop {
            let result =
                match tokio::time::timeout(self.config.query_timeout, self.resolver.lookup_mx(domain))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ResolverError::Timeout),
                };

            match result {
                Ok(records) => {
                    let usable: Vec<MxRecord> =
                        records.into_iter().filter(|r| !r.is_null()).collect();
                    if usable.is_empty() {
                        return (MxStatus::NoRecords, Vec::new());
                    }
                    return (MxStatus::Valid, usable);
                }
                Err(e) if e.is_transient() => {
                    if !self.config.retry.should_retry(attempt) {
                        warn!(
                            "MX lookup for {} via {} still failing after retry: {}",
                            domain,
                            self.resolver.name(),
                            e
                        );
                        return (MxStatus::Unconfirmed, Vec::new());
                    }
                    attempt += 1;
                    let backoff = self.config.retry.calculate_backoff(attempt);
                    warn!(
                        "Transient MX lookup failure for {}: {}, retrying in {:?}",
                        domain, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    debug!("No MX for {}: {}", domain, e);
                    return (MxStatus::NoRecords, Vec::new());
                }
            }
        }
    }
}
