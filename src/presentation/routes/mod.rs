// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::services::orchestrator::CrawlOrchestrator;
use crate::presentation::handlers::contact_handler;
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// 处理器依赖的编排器与配置通过 `Extension` 层注入
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(contact_handler::health))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/api/v1/scrape", post(contact_handler::scrape))
        .route("/api/v1/stats", get(contact_handler::stats));

    Router::new().merge(public_routes).merge(api_routes)
}

/// 组装完整应用
///
/// 在路由上挂载编排器、配置与请求追踪层
///
/// # 参数
///
/// * `orchestrator` - 爬取编排器
/// * `settings` - 进程配置
pub fn app(orchestrator: Arc<CrawlOrchestrator>, settings: Arc<Settings>) -> Router {
    routes()
        .layer(Extension(orchestrator))
        .layer(Extension(settings))
        .layer(TraceLayer::new_for_http())
}

/// 服务信息端点
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
