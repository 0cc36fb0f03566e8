// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use metrics::counter;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::models::mx::MxCacheEntry;

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub stores: u64,
    pub hit_rate: f64,
}

/// 进程级 MX 缓存
///
/// 以小写域名为键，条目以 `Arc` 共享且写入后不再修改。
/// 过期条目在读取时淘汰，超过容量时先清理过期条目，再淘汰最早写入的条目。
pub struct MxCache {
    entries: DashMap<String, Arc<MxCacheEntry>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    stores: AtomicU64,
}

impl Default for MxCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl MxCache {
    /// 创建新的MX缓存
    ///
    /// # 参数
    ///
    /// * `max_entries` - 最大缓存条目数
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    /// 规范化缓存键：小写并去除末尾的点
    pub fn cache_key(domain: &str) -> String {
        domain.trim().trim_end_matches('.').to_ascii_lowercase()
    }

    /// 获取未过期的缓存条目
    pub fn get(&self, domain: &str) -> Option<Arc<MxCacheEntry>> {
        let key = Self::cache_key(domain);
        // 先克隆出 Arc，释放分片读锁后再做删除
        let cached = self.entries.get(&key).map(|e| Arc::clone(e.value()));

        match cached {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                counter!("mx_cache_hits_total").increment(1);
                debug!("MX cache hit for {}", key);
                Some(entry)
            }
            Some(_) => {
                if self.entries.remove_if(&key, |_, e| e.is_expired()).is_some() {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                self.record_miss();
                debug!("MX cache entry for {} expired", key);
                None
            }
            None => {
                self.record_miss();
                None
            }
        }
    }

    /// 查看未过期的缓存条目，不计入命中统计也不触发淘汰
    pub fn peek(&self, domain: &str) -> Option<Arc<MxCacheEntry>> {
        self.entries
            .get(&Self::cache_key(domain))
            .map(|e| Arc::clone(e.value()))
            .filter(|entry| !entry.is_expired())
    }

    /// 写入缓存条目，同一域名后写者覆盖
    pub fn put(&self, entry: MxCacheEntry) -> Arc<MxCacheEntry> {
        let key = Self::cache_key(&entry.domain);
        let entry = Arc::new(entry);
        self.entries.insert(key.clone(), Arc::clone(&entry));
        self.stores.fetch_add(1, Ordering::Relaxed);
        debug!("Stored MX result for {} ({})", key, entry.status);

        self.evict_if_needed();
        entry
    }

    /// 删除指定域名的缓存
    pub fn invalidate(&self, domain: &str) -> bool {
        self.entries.remove(&Self::cache_key(domain)).is_some()
    }

    /// 清空缓存
    pub fn clear(&self) {
        self.entries.clear();
        info!("Cleared all MX cache entries");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 获取缓存统计信息
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: self.entries.len(),
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("mx_cache_misses_total").increment(1);
    }

    fn evict_if_needed(&self) {
        if self.entries.len() <= self.max_entries {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired());
        let mut evicted = before.saturating_sub(self.entries.len());

        let current_size = self.entries.len();
        if current_size > self.max_entries {
            let to_evict = current_size - self.max_entries;
            let mut by_age: Vec<(String, chrono::DateTime<chrono::Utc>)> = self
                .entries
                .iter()
                .map(|e| (e.key().clone(), e.value().cached_at))
                .collect();
            by_age.sort_by_key(|(_, cached_at)| *cached_at);

            for (key, _) in by_age.into_iter().take(to_evict) {
                if self.entries.remove(&key).is_some() {
                    evicted += 1;
                }
            }
        }

        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        debug!("Evicted {} entries from MX cache", evicted);
    }
}
