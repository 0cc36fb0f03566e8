// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! HTTP 阶段到渲染阶段的提升规则

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::models::email::parse_email;

/// 可见文本少于该长度且页面带脚本时视为脚本外壳
const SHELL_TEXT_THRESHOLD: usize = 200;
/// 挂载点为空时允许的最大可见文本长度
const MOUNT_TEXT_THRESHOLD: usize = 500;

/// 不计入可见文本的元素
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// 编码或混淆形式的联系信息迹象
///
/// 单独的 `@` 不算：CSS 的 `@media`、CDN 地址 `react@18` 在脚本外壳中很常见
const CONTACT_SIGNALS: &[&str] = &[
    "mailto:",
    "&#64;",
    "&#x40;",
    "&commat;",
    "[at]",
    "(at)",
    "{at}",
];

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,63}\b").unwrap());

static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

static MOUNT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#root, #app, #__next, #__nuxt, [ng-app], [data-reactroot], [data-server-rendered]")
        .unwrap()
});

static NOSCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("noscript").unwrap());

/// 判断HTTP响应是否需要提升到渲染阶段
///
/// 页面已有邮箱迹象时不提升；否则当可见文本很少且依赖脚本，
/// 或存在空的客户端渲染挂载点，或带有"启用 JavaScript"提示时提升。
pub fn needs_rendering(html: &str) -> bool {
    if has_contact_signal(html) {
        return false;
    }

    let document = Html::parse_document(html);
    let visible = visible_text_len(&document);
    let has_scripts = document.select(&SCRIPT_SELECTOR).next().is_some();

    if has_scripts && visible < SHELL_TEXT_THRESHOLD {
        return true;
    }

    let empty_mount = document
        .select(&MOUNT_SELECTOR)
        .any(|el| el.text().all(|t| t.trim().is_empty()));
    if empty_mount && visible < MOUNT_TEXT_THRESHOLD {
        return true;
    }

    document.select(&NOSCRIPT_SELECTOR).any(|el| {
        let text = el.text().collect::<String>().to_ascii_lowercase();
        text.contains("enable javascript") || text.contains("javascript is required")
    }) && visible < MOUNT_TEXT_THRESHOLD
}

/// 页面是否已包含可提取的邮箱迹象
pub fn has_contact_signal(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    CONTACT_SIGNALS.iter().any(|s| lower.contains(s))
        || EMAIL_SHAPE_RE
            .find_iter(html)
            .any(|m| parse_email(m.as_str()).is_some())
}

fn visible_text_len(document: &Html) -> usize {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            (!hidden).then(|| text.trim().chars().count())
        })
        .sum()
}
