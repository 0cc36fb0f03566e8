// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use contactrs::config::settings::Settings;
use contactrs::domain::services::extraction_service::EmailExtractor;
use contactrs::domain::services::mx_validator::{MxValidator, MxValidatorConfig};
use contactrs::domain::services::orchestrator::{CrawlOrchestrator, OrchestratorConfig};
use contactrs::engines::fetcher::PageFetcher;
use contactrs::engines::render_engine::RenderEngine;
use contactrs::engines::reqwest_engine::ReqwestEngine;
use contactrs::engines::traits::PageEngine;
use contactrs::infrastructure::cache::mx_cache::MxCache;
use contactrs::infrastructure::dns::hickory_resolver::HickoryMxResolver;
use contactrs::infrastructure::metrics;
use contactrs::presentation::routes;
use contactrs::utils::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting contactrs...");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Metrics
    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen)?;
    }

    // 4. DNS resolver and MX cache
    let resolver = Arc::new(HickoryMxResolver::new(Duration::from_millis(
        settings.dns.query_timeout_ms,
    )));
    let cache = Arc::new(MxCache::new(settings.cache.max_entries));
    let validator = Arc::new(MxValidator::new(
        resolver,
        cache,
        MxValidatorConfig::from_settings(&settings),
    ));
    info!("MX validator initialized");

    // 5. Page engines
    let http: Arc<dyn PageEngine> = Arc::new(ReqwestEngine::new(&settings.crawler.user_agent)?);
    let renderer: Option<Arc<dyn PageEngine>> = if settings.crawler.enable_rendering {
        Some(Arc::new(RenderEngine::new(
            settings.crawler.render_remote_url.clone(),
            settings.crawler.user_agent.clone(),
        )))
    } else {
        info!("Rendering disabled, HTTP stage only");
        None
    };
    let fetcher = Arc::new(PageFetcher::new(http, renderer));

    // 6. Orchestrator
    let orchestrator = Arc::new(CrawlOrchestrator::new(
        fetcher,
        Arc::new(EmailExtractor::default()),
        validator,
        OrchestratorConfig::from_settings(&settings),
    ));

    // 7. Start HTTP server
    let app = routes::app(orchestrator, settings.clone());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
