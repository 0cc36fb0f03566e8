// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};

use crate::domain::models::email::StrategyKind;

/// 标准邮箱正则
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,63}").unwrap());

/// `[at]` `(at)` `{at}` `<at>` 形式
static BRACKET_AT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[ \t]*(?:\[\s*(?:at|@)\s*\]|\(\s*(?:at|@)\s*\)|\{\s*(?:at|@)\s*\}|<\s*at\s*>)[ \t]*")
        .unwrap()
});

/// 单字母 `(a)` `[a]`，只在两侧紧贴地址字符时改写，避免误伤列表编号
static TIGHT_LETTER_AT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([a-z0-9._%+-])(?:\(a\)|\[a\])([a-z0-9])").unwrap()
});

/// `[dot]` `(dot)` `{dot}` `<dot>` 形式
static BRACKET_DOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[ \t]*(?:\[\s*(?:dot|\.)\s*\]|\(\s*(?:dot|\.)\s*\)|\{\s*(?:dot|\.)\s*\}|<\s*dot\s*>)[ \t]*")
        .unwrap()
});

/// `name at example dot com`，域名中至少出现一次 `dot` 才会改写
static BARE_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([a-z0-9._%+-]+)[ \t]+at[ \t]+([a-z0-9-]+(?:[ \t]+dot[ \t]+[a-z0-9-]+)+)\b")
        .unwrap()
});

static BARE_DOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[ \t]+dot[ \t]+").unwrap());

/// 允许 `@` 与 `.` 两侧插入空白的邮箱正则
///
/// 只有 `@` 本身被空白隔开时，域名中的 `.` 两侧才允许空白；
/// 紧凑写法的地址后面跟句号不会吞并下一句的单词。
static SPACED_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[a-z0-9._%+-]+(?:(?:[ \t]{1,3}@[ \t]{0,3}|@[ \t]{1,3})[a-z0-9-]+(?:[ \t]{0,3}\.[ \t]{0,3}[a-z0-9-]+)*[ \t]{0,3}\.[ \t]{0,3}[a-z]{2,63}|@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,63})\b",
    )
    .unwrap()
});

static MAILTO_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("[href]").unwrap());

static ATTRIBUTE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[data-email], [data-contact], [data-mail], [title], [alt], [value], meta[content]")
        .unwrap()
});

static MICROFORMAT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[itemprop="email"], .u-email, .email, .e-mail, .contact-email"#).unwrap()
});

/// 可能携带邮箱的属性
const EMAIL_ATTRIBUTES: &[&str] = &[
    "data-email",
    "data-contact",
    "data-mail",
    "title",
    "alt",
    "value",
    "content",
];

/// 已解析的页面
///
/// 持有原始HTML和解析后的文档，只在同步提取过程中存在，不跨越 `.await`
pub struct PageDocument<'a> {
    raw: &'a str,
    html: Html,
}

impl<'a> PageDocument<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            html: Html::parse_document(raw),
        }
    }

    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// 以空格连接的全部文本节点（实体已解码）
    pub fn text(&self) -> String {
        self.html
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 邮箱提取策略
///
/// 纯函数：输入页面，输出原始匹配字符串，结构校验与去重由提取器负责
pub trait ExtractionStrategy: Send + Sync {
    /// 从页面中提取原始匹配
    fn extract(&self, page: &PageDocument<'_>) -> Vec<String>;

    /// 策略类型
    fn kind(&self) -> StrategyKind;
}

/// 纯文本策略
///
/// 在原始HTML上运行标准邮箱正则，覆盖正文与注释
pub struct PlainTextStrategy;

impl ExtractionStrategy for PlainTextStrategy {
    fn extract(&self, page: &PageDocument<'_>) -> Vec<String> {
        EMAIL_RE
            .find_iter(page.raw())
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::PlainText
    }
}

/// 标记策略
///
/// 提取 `mailto:` 链接目标和联系人微格式（`data-email`、`itemprop="email"`、h-card 等）
pub struct MarkupStrategy;

impl MarkupStrategy {
    /// 解析 mailto 目标，支持百分号编码和多个收件人
    fn mailto_recipients(href: &str) -> Vec<String> {
        let trimmed = href.trim();
        let target = match (trimmed.get(..7), trimmed.get(7..)) {
            (Some(scheme), Some(rest)) if scheme.eq_ignore_ascii_case("mailto:") => rest,
            _ => return Vec::new(),
        };

        let target = target.split('?').next().unwrap_or_default();
        let decoded = urlencoding::decode(target)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| target.to_string());

        decoded
            .split([',', ';'])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn scan(value: &str, out: &mut Vec<String>) {
        if !value.contains('@') && !value.contains("%40") {
            return;
        }
        let decoded = urlencoding::decode(value)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| value.to_string());
        out.extend(EMAIL_RE.find_iter(&decoded).map(|m| m.as_str().to_string()));
    }
}

impl ExtractionStrategy for MarkupStrategy {
    fn extract(&self, page: &PageDocument<'_>) -> Vec<String> {
        let mut found = Vec::new();
        let html = page.html();

        for element in html.select(&MAILTO_SELECTOR) {
            if let Some(href) = element.value().attr("href") {
                found.extend(Self::mailto_recipients(href));
            }
        }

        for element in html.select(&ATTRIBUTE_SELECTOR) {
            for attr in EMAIL_ATTRIBUTES {
                if let Some(value) = element.value().attr(attr) {
                    Self::scan(value, &mut found);
                }
            }
        }

        for element in html.select(&MICROFORMAT_SELECTOR) {
            let text = element.text().collect::<Vec<_>>().join("");
            Self::scan(text.trim(), &mut found);
        }

        found
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Markup
    }
}

/// 反混淆策略
///
/// 解码HTML实体，改写 `[at]`/`[dot]` 等替换写法，折叠 `@` 与 `.` 两侧的空白后重新匹配
pub struct ObfuscationStrategy;

impl ObfuscationStrategy {
    /// 将常见混淆写法还原为标准形式
    pub fn deobfuscate(input: &str) -> String {
        let text = BRACKET_AT_RE.replace_all(input, "@");
        let text = TIGHT_LETTER_AT_RE.replace_all(&text, "${1}@${2}");
        let text = BRACKET_DOT_RE.replace_all(&text, ".");
        BARE_WORD_RE
            .replace_all(&text, |caps: &Captures| {
                format!("{}@{}", &caps[1], BARE_DOT_RE.replace_all(&caps[2], "."))
            })
            .into_owned()
    }

    fn collect(text: &str, out: &mut Vec<String>) {
        let rewritten = Self::deobfuscate(text);
        out.extend(
            SPACED_EMAIL_RE
                .find_iter(&rewritten)
                .map(|m| m.as_str().split_whitespace().collect::<String>()),
        );
    }
}

impl ExtractionStrategy for ObfuscationStrategy {
    fn extract(&self, page: &PageDocument<'_>) -> Vec<String> {
        let mut found = Vec::new();

        let decoded = html_escape::decode_html_entities(page.raw());
        Self::collect(&decoded, &mut found);
        // 文本节点能还原被标签拆开的地址
        Self::collect(&page.text(), &mut found);

        found
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Obfuscation
    }
}
