// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 提取服务（extraction_service）：合并多个提取策略的候选邮箱
/// - 提取策略（extraction_strategies）：纯文本、标记属性、反混淆三种策略
/// - MX 校验（mx_validator）：带缓存的域名 MX 校验
/// - 编排器（orchestrator）：页面计划、派发、合并与提前终止
pub mod extraction_service;
pub mod extraction_strategies;
pub mod mx_validator;
pub mod orchestrator;
