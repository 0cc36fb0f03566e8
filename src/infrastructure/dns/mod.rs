// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 系统 DNS 配置上的 MX 解析实现
pub mod hickory_resolver;
