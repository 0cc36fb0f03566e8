// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::dns::resolver::{MxResolver, ResolverError};
use crate::domain::models::mx::MxRecord;

/// 基于 hickory-resolver 的 MX 解析器
///
/// 优先读取系统 DNS 配置，失败时回退到默认上游。
/// 重试由 MX 校验器负责，这里每次查询只尝试一次。
pub struct HickoryMxResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryMxResolver {
    /// 创建新的解析器
    ///
    /// # 参数
    ///
    /// * `query_timeout` - 单次查询超时时间
    pub fn new(query_timeout: Duration) -> Self {
        let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!(
                    "Failed to read system DNS configuration, using defaults: {}",
                    e
                );
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = query_timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    fn map_error(domain: &str, error: ResolveError) -> ResolverError {
        match error.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
                ResponseCode::NXDomain => ResolverError::NxDomain,
                ResponseCode::ServFail => ResolverError::ServFail,
                _ => ResolverError::NoRecords,
            },
            ResolveErrorKind::Timeout => ResolverError::Timeout,
            _ => {
                debug!("MX lookup for {} failed: {}", domain, error);
                ResolverError::Other(error.to_string())
            }
        }
    }
}

#[async_trait]
impl MxResolver for HickoryMxResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolverError> {
        // 末尾加点表示完全限定名，避免系统 search 域被追加
        let fqdn = format!("{}.", domain.trim_end_matches('.'));
        let lookup = self
            .resolver
            .mx_lookup(fqdn.as_str())
            .await
            .map_err(|e| Self::map_error(domain, e))?;

        let records: Vec<MxRecord> = lookup
            .iter()
            .map(|mx| {
                MxRecord::new(
                    mx.preference(),
                    mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                )
            })
            .collect();

        if records.is_empty() {
            return Err(ResolverError::NoRecords);
        }
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "hickory"
    }
}
