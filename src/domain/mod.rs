// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：页面、候选邮箱、MX 记录和爬取结果
/// - DNS 抽象（dns）：MX 解析器接口
/// - 服务（services）：邮箱提取、MX 校验和爬取编排
///
/// 领域层只依赖抽象接口，HTTP、浏览器和 DNS 的具体实现位于
/// engines 与 infrastructure 模块。
pub mod dns;
pub mod models;
pub mod services;
