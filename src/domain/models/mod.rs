// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 爬取请求与结果（crawl）：请求参数、页面计划和最终结果
/// - 候选邮箱（email）：提取出的邮箱及其结构校验
/// - MX 记录（mx）：MX 查询结果和缓存条目
/// - 页面结果（page）：单个页面的获取结果
pub mod crawl;
pub mod email;
pub mod mx;
pub mod page;
