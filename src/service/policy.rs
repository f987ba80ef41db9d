//! 受限页面策略：浏览器内部页面与扩展页面不做检测

use crate::error::{TdResult, TechDetectorError};

/// 受限URL前缀
pub const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "moz-extension://",
    "chrome-search://",
    "chrome-untrusted://",
    "devtools://",
];

pub fn is_restricted_url(url: &str) -> bool {
    RESTRICTED_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// 受限页面返回 `RestrictedContext` 错误
pub fn ensure_allowed(url: &str) -> TdResult<()> {
    if is_restricted_url(url) {
        return Err(TechDetectorError::RestrictedContext(url.to_string()));
    }
    Ok(())
}
