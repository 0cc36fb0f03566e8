// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, FetchRequest, FetchResponse, PageEngine};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// 浏览器协议请求超时
const BROWSER_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 渲染引擎
///
/// 基于chromiumoxide的无头浏览器渲染，用于依赖脚本生成内容的页面。
/// 浏览器在首次使用时启动（或连接远程实例），之后在所有请求间共享，每个页面单独开标签页。
pub struct RenderEngine {
    browser: OnceCell<Browser>,
    remote_url: Option<String>,
    user_agent: String,
}

impl RenderEngine {
    /// 创建渲染引擎
    ///
    /// # 参数
    ///
    /// * `remote_url` - 远程 Chrome 调试地址，`None` 时在本地启动
    /// * `user_agent` - 页面使用的 User-Agent
    pub fn new(remote_url: Option<String>, user_agent: impl Into<String>) -> Self {
        Self {
            browser: OnceCell::new(),
            remote_url,
            user_agent: user_agent.into(),
        }
    }

    /// 获取或初始化共享浏览器实例
    async fn browser(&self) -> Result<&Browser, EngineError> {
        self.browser
            .get_or_try_init(|| async {
                let (browser, mut handler) = if let Some(url) = &self.remote_url {
                    info!("Connecting to remote Chrome instance at: {}", url);
                    Browser::connect(url.as_str()).await.map_err(|e| {
                        EngineError::Render(format!("Failed to connect to remote Chrome: {}", e))
                    })?
                } else {
                    let config = BrowserConfig::builder()
                        .no_sandbox()
                        .request_timeout(BROWSER_REQUEST_TIMEOUT)
                        .arg("--disable-gpu")
                        .arg("--disable-dev-shm-usage")
                        .build()
                        .map_err(EngineError::Render)?;

                    info!("Launching headless Chrome");
                    Browser::launch(config)
                        .await
                        .map_err(|e| EngineError::Render(e.to_string()))?
                };

                // 处理浏览器事件
                tokio::spawn(async move {
                    while let Some(h) = handler.next().await {
                        if h.is_err() {
                            break;
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }

    async fn render_in(&self, page: &Page, url: &str) -> Result<(String, String), EngineError> {
        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;

        // goto 会等待 load 事件
        page.goto(url)
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;

        let content = page
            .content()
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok((content, final_url))
    }

    async fn render(&self, url: &str) -> Result<(String, String), EngineError> {
        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Render(e.to_string()))?;

        let result = self.render_in(&page, url).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close render tab for {}: {}", url, e);
        }
        result
    }
}

#[async_trait]
impl PageEngine for RenderEngine {
    /// 渲染页面并返回最终HTML
    ///
    /// # 参数
    ///
    /// * `request` - 获取请求，超时覆盖启动浏览器、导航和读取内容的全过程
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 渲染后的HTML
    /// * `Err(EngineError)` - 超时或渲染失败
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let start = Instant::now();
        debug!("Rendering {}", request.url);

        let (content, final_url) = tokio::time::timeout(request.timeout, self.render(&request.url))
            .await
            .map_err(|_| EngineError::Timeout)??;

        Ok(FetchResponse {
            // 渲染路径拿不到响应状态码
            status_code: 200,
            content,
            content_type: "text/html".to_string(),
            final_url,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}
