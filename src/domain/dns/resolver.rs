// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::mx::MxRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Domain does not exist")]
    NxDomain,
    #[error("No MX records found")]
    NoRecords,
    #[error("DNS query timed out")]
    Timeout,
    #[error("DNS server failure")]
    ServFail,
    #[error("Resolver error: {0}")]
    Other(String),
}

impl ResolverError {
    /// 是否为瞬时失败（可重试，结果无法确认）
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ResolverError::Timeout | ResolverError::ServFail | ResolverError::Other(_)
        )
    }
}

#[async_trait]
pub trait MxResolver: Send + Sync {
    /// Look up the MX records of a domain
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolverError>;

    /// Get the name of the resolver
    fn name(&self) -> &'static str;
}
