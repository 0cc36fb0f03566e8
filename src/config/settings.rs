// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 默认浏览器 User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、爬取、DNS、缓存、候选策略和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 爬取配置
    pub crawler: CrawlerSettings,
    /// DNS 查询配置
    pub dns: DnsSettings,
    /// MX 缓存配置
    pub cache: CacheSettings,
    /// 结果判定策略
    pub policy: PolicySettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 默认最大访问页面数
    pub default_max_pages: usize,
    /// API 允许的最大页面数上限
    pub max_pages_limit: usize,
    /// 默认整体超时时间（秒）
    pub default_timeout_secs: u64,
    /// 单页面获取超时时间（秒），HTTP 与渲染两个阶段共用
    pub page_timeout_secs: u64,
    /// 是否启用浏览器渲染
    pub enable_rendering: bool,
    /// 联系页面阶段是否并发获取
    pub concurrent: bool,
    /// 并发获取时的最大并发数
    pub max_concurrency: usize,
    /// HTTP 请求使用的 User-Agent
    pub user_agent: String,
    /// 远程 Chrome 调试地址（为空时本地启动）
    pub render_remote_url: Option<String>,
}

/// DNS 查询配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DnsSettings {
    /// 单次 MX 查询超时时间（毫秒）
    pub query_timeout_ms: u64,
    /// 瞬时失败后重试前的退避时间（毫秒）
    pub retry_backoff_ms: u64,
}

/// MX 缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// 有效 MX 结果的缓存时间（秒）
    pub positive_ttl_secs: u64,
    /// 无 MX / NXDOMAIN 结果的缓存时间（秒）
    pub negative_ttl_secs: u64,
    /// 无法确认（瞬时失败）结果的缓存时间（秒）
    pub unconfirmed_ttl_secs: u64,
    /// 最大缓存条目数
    pub max_entries: usize,
}

/// 结果判定策略设置
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySettings {
    /// 只找到角色类地址时是否视为成功
    pub role_only_counts_as_success: bool,
    /// 参与 MX 校验的候选邮箱范围
    pub candidate_scope: CandidateScope,
    /// 目标域名已缓存为无 MX 记录时直接跳过爬取
    pub skip_known_invalid_domains: bool,
}

/// 候选邮箱范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CandidateScope {
    /// 所有结构合法的候选
    #[default]
    Any,
    /// 仅爬取域名及其子域名
    SameDomain,
    /// 爬取域名及公共邮箱服务商
    SameDomainOrPublic,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加内置默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `CONTACTRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CONTACTRS").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // Crawler
            .set_default("crawler.default_max_pages", 50)?
            .set_default("crawler.max_pages_limit", 100)?
            .set_default("crawler.default_timeout_secs", 30)?
            .set_default("crawler.page_timeout_secs", 15)?
            .set_default("crawler.enable_rendering", true)?
            .set_default("crawler.concurrent", true)?
            .set_default("crawler.max_concurrency", 5)?
            .set_default("crawler.user_agent", DEFAULT_USER_AGENT)?
            // DNS
            .set_default("dns.query_timeout_ms", 5000)?
            .set_default("dns.retry_backoff_ms", 250)?
            // MX cache
            .set_default("cache.positive_ttl_secs", 86400)?
            .set_default("cache.negative_ttl_secs", 3600)?
            .set_default("cache.unconfirmed_ttl_secs", 300)?
            .set_default("cache.max_entries", 10000)?
            // Policy
            .set_default("policy.role_only_counts_as_success", true)?
            .set_default("policy.candidate_scope", "any")?
            .set_default("policy.skip_known_invalid_domains", false)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen", "0.0.0.0:9000")
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawler.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "crawler.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.crawler.page_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "crawler.page_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.crawler.default_max_pages == 0 || self.crawler.max_pages_limit == 0 {
            return Err(ConfigError::Message(
                "crawler page limits must be at least 1".to_string(),
            ));
        }
        if self.dns.query_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "dns.query_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 单页面获取超时时间
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.page_timeout_secs)
    }

    /// 默认整体超时时间
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.default_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            crawler: CrawlerSettings {
                default_max_pages: 50,
                max_pages_limit: 100,
                default_timeout_secs: 30,
                page_timeout_secs: 15,
                enable_rendering: true,
                concurrent: true,
                max_concurrency: 5,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                render_remote_url: None,
            },
            dns: DnsSettings {
                query_timeout_ms: 5000,
                retry_backoff_ms: 250,
            },
            cache: CacheSettings {
                positive_ttl_secs: 86400,
                negative_ttl_secs: 3600,
                unconfirmed_ttl_secs: 300,
                max_entries: 10000,
            },
            policy: PolicySettings {
                role_only_counts_as_success: true,
                candidate_scope: CandidateScope::Any,
                skip_known_invalid_domains: false,
            },
            metrics: MetricsSettings {
                enabled: false,
                listen: "0.0.0.0:9000".to_string(),
            },
        }
    }
}
