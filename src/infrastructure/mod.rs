// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 缓存（cache）：进程内 MX 结果缓存
/// - DNS（dns）：基于 hickory 的 MX 解析器
/// - 指标（metrics）：Prometheus 指标导出
///
/// 基础设施层实现领域层定义的抽象接口，领域层不依赖具体技术实现。
pub mod cache;
pub mod dns;
pub mod metrics;
