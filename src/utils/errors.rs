// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 爬取请求级错误类型
///
/// 只有在访问任何页面之前就能确定的问题才会作为错误返回，
/// 单个页面或候选邮箱的失败记录在结果中，不会中止爬取。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}
