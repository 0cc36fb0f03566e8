// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 固定的页面路径与邮箱分类表

/// 根页面之后按优先级访问的候选页面路径
///
/// 顺序即访问顺序：联系页、关于页、支持页、销售页。
pub const CONTACT_PAGES: &[&str] = &[
    // Contact pages
    "/contact",
    "/contact-us",
    "/contactus",
    "/contact_us",
    "/get-in-touch",
    "/reach-us",
    "/contact-information",
    "/contact.html",
    "/contact.php",
    // About pages
    "/about",
    "/about-us",
    "/aboutus",
    "/about_us",
    "/who-we-are",
    "/our-story",
    "/our-company",
    "/company",
    "/company-info",
    "/about.html",
    // Support pages
    "/support",
    "/help",
    "/customer-service",
    "/customer-support",
    "/customer-care",
    "/service",
    "/helpdesk",
    "/help-center",
    "/faq",
    "/frequently-asked-questions",
    "/contact-support",
    // Sales pages
    "/sales",
    "/sales-inquiry",
    "/request-quote",
    "/get-quote",
    "/quote",
    "/pricing",
    "/buy",
    "/purchase",
    "/order",
    "/wholesale",
    "/bulk-orders",
    "/b2b",
    "/business",
    "/enterprise",
    "/partner",
    "/partnerships",
    "/distributors",
    "/resellers",
    "/vendors",
];

/// 角色类（非人工收件）邮箱的本地部分
pub const ROLE_LOCAL_PARTS: &[&str] = &[
    "noreply",
    "no-reply",
    "no_reply",
    "donotreply",
    "do-not-reply",
    "do_not_reply",
    "mailer-daemon",
    "postmaster",
    "bounce",
    "bounces",
    "notifications",
    "notification",
];

/// 看起来像邮箱、实际是静态资源文件名的"顶级域"
///
/// 例如 `logo@2x.png`、`sprite@3x.webp`。
pub const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "bmp", "ico", "css", "js", "mjs", "map",
    "json", "woff", "woff2", "ttf", "eot", "otf", "mp4", "webm", "mp3", "pdf", "zip",
];

/// 常见的公共邮箱服务商域名
pub const PUBLIC_EMAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "ymail.com",
    "rocketmail.com",
    "hotmail.com",
    "outlook.com",
    "live.com",
    "msn.com",
    "aol.com",
    "aim.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "mail.com",
    "protonmail.com",
    "proton.me",
    "yandex.com",
    "yandex.ru",
    "zoho.com",
    "gmx.com",
    "gmx.de",
    "web.de",
    "t-online.de",
    "fastmail.com",
    "tutanota.com",
    "mail.ru",
    "qq.com",
    "163.com",
    "126.com",
    "sina.com",
    "naver.com",
    "daum.net",
    "rediffmail.com",
    "comcast.net",
    "att.net",
    "sbcglobal.net",
    "verizon.net",
    "orange.fr",
    "laposte.net",
    "libero.it",
    "bigpond.com",
    "uol.com.br",
];

/// 本地部分是否属于角色类地址（不区分大小写）
pub fn is_role_local_part(local_part: &str) -> bool {
    let lower = local_part.to_ascii_lowercase();
    ROLE_LOCAL_PARTS.iter().any(|role| *role == lower)
}

/// 域名是否属于公共邮箱服务商
pub fn is_public_provider(domain: &str) -> bool {
    let lower = domain.trim_end_matches('.').to_ascii_lowercase();
    PUBLIC_EMAIL_PROVIDERS.iter().any(|p| *p == lower)
}
