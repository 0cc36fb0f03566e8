// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含对外暴露的数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、邮箱提取、MX 校验与爬取编排
pub mod domain;

/// 引擎模块
///
/// 实现页面获取引擎（HTTP 与浏览器渲染）
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如 DNS 解析、缓存、指标等
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
