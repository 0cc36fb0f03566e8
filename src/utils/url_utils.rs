// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

use crate::utils::errors::CrawlError;

/// 规范化后的爬取目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTarget {
    /// 根URL（scheme://host[:port]/）
    pub root_url: Url,
    /// 裸域名（小写，去除 `www.` 前缀和末尾的点）
    pub domain: String,
}

/// 将用户输入的URL或域名规范化为根URL和裸域名
///
/// 没有 scheme 时默认使用 https，只接受 http 与 https。
/// 路径、查询参数、片段和用户信息都会被丢弃。
///
/// # 参数
///
/// * `input` - 用户输入，例如 `example.com`、`https://www.Example.com/about`
///
/// # 返回值
///
/// * `Ok(NormalizedTarget)` - 规范化后的目标
/// * `Err(CrawlError::InvalidInput)` - 输入为空、无法解析或缺少主机名
pub fn normalize_target(input: &str) -> Result<NormalizedTarget, CrawlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CrawlError::InvalidInput("url cannot be empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches("//"))
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| CrawlError::InvalidInput(format!("invalid url '{}': {}", trimmed, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CrawlError::InvalidInput(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
        _ => {
            return Err(CrawlError::InvalidInput(format!(
                "url '{}' has no host",
                trimmed
            )))
        }
    };

    let bare = host.trim_end_matches('.');
    let domain = bare.strip_prefix("www.").unwrap_or(bare).to_string();
    if domain.is_empty() || (!domain.contains('.') && domain != "localhost" && !is_ip_host(&domain))
    {
        return Err(CrawlError::InvalidInput(format!(
            "'{}' is not a valid domain",
            trimmed
        )));
    }

    let mut root_url = parsed;
    root_url.set_path("/");
    root_url.set_query(None);
    root_url.set_fragment(None);
    // 无法设置用户信息的URL（cannot-be-a-base）在上面已被 host 检查排除
    let _ = root_url.set_username("");
    let _ = root_url.set_password(None);

    Ok(NormalizedTarget { root_url, domain })
}

/// 将计划中的页面路径拼接到根URL上
pub fn build_page_url(root_url: &Url, path: &str) -> Result<Url, CrawlError> {
    root_url
        .join(path)
        .map_err(|e| CrawlError::InvalidInput(format!("invalid page path '{}': {}", path, e)))
}

/// 判断 `candidate` 是否等于 `domain` 或是其子域名（均不区分大小写）
pub fn is_same_or_subdomain(candidate: &str, domain: &str) -> bool {
    let candidate = candidate.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    candidate == domain || candidate.ends_with(&format!(".{}", domain))
}

fn is_ip_host(host: &str) -> bool {
    host.starts_with('[') || host.parse::<std::net::Ipv4Addr>().is_ok()
}
