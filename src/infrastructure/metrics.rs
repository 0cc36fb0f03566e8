// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 安装 Prometheus 导出器并注册指标说明
///
/// # 参数
///
/// * `listen` - 导出器监听地址，如 `0.0.0.0:9000`
///
/// # 返回值
///
/// * `Ok(())` - 导出器已启动，或端口被占用时仅记录警告
/// * `Err(anyhow::Error)` - 监听地址无法解析
pub fn init_metrics(listen: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = listen.parse()?;

    // 端口被占用时（开发或测试环境）只记录警告
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!("crawl_requests_total", "Completed contact crawls by outcome");
    describe_counter!("crawl_pages_fetched_total", "Page fetches by outcome");
    describe_histogram!(
        "crawl_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of a contact crawl"
    );
    describe_counter!("mx_cache_hits_total", "MX cache lookups served from cache");
    describe_counter!("mx_cache_misses_total", "MX cache lookups that required DNS");
    describe_counter!("mx_lookups_total", "DNS MX lookups by resulting status");
}
