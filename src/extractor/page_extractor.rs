//! 快照提取器：由页面上下文构建单次检测用的页面快照

use tracing::debug;
use url::Url;

use super::cookie::parse_cookie_string;
use super::globals::{probe_watch_list, DeclaredGlobals, GlobalScope};
use super::html_extractor::HtmlExtractor;
use super::snapshot::{DomDocument, PageSnapshot};
use crate::error::{TdResult, TechDetectorError};

/// 页面上下文：构建快照所需的原始输入
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    pub url: &'a str,
    pub html: &'a str,
    pub cookie_string: Option<&'a str>,
    /// 全局作用域；为 None 时根据内联脚本推断
    pub scope: Option<&'a dyn GlobalScope>,
    pub service_worker: bool,
}

impl<'a> PageContext<'a> {
    pub fn new(url: &'a str, html: &'a str) -> Self {
        Self {
            url,
            html,
            cookie_string: None,
            scope: None,
            service_worker: false,
        }
    }

    pub fn with_cookies(mut self, cookie_string: &'a str) -> Self {
        self.cookie_string = Some(cookie_string);
        self
    }

    pub fn with_scope(mut self, scope: &'a dyn GlobalScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_service_worker(mut self, supported: bool) -> Self {
        self.service_worker = supported;
        self
    }
}

/// 快照提取器接口
pub trait SnapshotExtractor {
    fn extract(&self, context: &PageContext<'_>) -> TdResult<PageSnapshot>;
}

/// 基于HTML文本的快照提取器
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSnapshotExtractor;

impl HtmlSnapshotExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotExtractor for HtmlSnapshotExtractor {
    fn extract(&self, context: &PageContext<'_>) -> TdResult<PageSnapshot> {
        if context.url.trim().is_empty() {
            return Err(TechDetectorError::SnapshotUnavailable(
                "页面URL为空".to_string(),
            ));
        }
        let base = Url::parse(context.url)?;

        // 1. 流式提取标签信号
        let signals = HtmlExtractor::new(Some(base)).extract(context.html);

        // 2. 探测全局变量
        let globals = match context.scope {
            Some(scope) => probe_watch_list(scope),
            None => probe_watch_list(&DeclaredGlobals::from_entries(&signals.scripts)),
        };

        // 3. 解析Cookie
        let cookies = context
            .cookie_string
            .map(parse_cookie_string)
            .unwrap_or_default();

        debug!(
            "快照提取完成：url={}，meta {}条，script {}条，样式表 {}条，全局变量 {}个，Cookie {}个",
            context.url,
            signals.meta.len(),
            signals.scripts.len(),
            signals.stylesheets.len(),
            globals.len(),
            cookies.len()
        );

        let mut builder = PageSnapshot::builder()
            .url(context.url)
            .markup(context.html)
            .title(signals.title)
            .metas(signals.meta)
            .globals(globals)
            .cookies(cookies)
            .dom(DomDocument::parse(context.html))
            .service_worker(context.service_worker);
        for entry in signals.scripts {
            builder = builder.script(entry);
        }
        for entry in signals.stylesheets {
            builder = builder.stylesheet(entry);
        }
        for (name, value) in signals.header_hints {
            builder = builder.header_hint(name, value);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::snapshot::ResourceEntry;
    use std::collections::HashSet;

    const PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Shop</title>
  <meta property="og:type" content="website">
  <meta http-equiv="Content-Security-Policy" content="default-src 'self'">
  <link rel="stylesheet" href="https://fonts.googleapis.com/css?family=Roboto">
  <script src="/static/js/jquery-3.6.0.min.js"></script>
  <script>window.dataLayer = window.dataLayer || [];</script>
</head><body><div class="container"></div></body></html>"#;

    #[test]
    fn test_extract_full_snapshot() {
        let context = PageContext::new("https://shop.example.com/", PAGE).with_cookies("_ga=1; bad");
        let snapshot = HtmlSnapshotExtractor::new().extract(&context).unwrap();

        assert_eq!(snapshot.title(), "Shop");
        assert_eq!(snapshot.meta()["og:type"], "website");
        assert_eq!(snapshot.header_hints()["content-security-policy"], "detected");
        assert_eq!(
            snapshot.scripts()[0],
            ResourceEntry::Url("https://shop.example.com/static/js/jquery-3.6.0.min.js".to_string())
        );
        assert_eq!(snapshot.stylesheets().len(), 1);
        assert!(snapshot.has_global("dataLayer"));
        assert_eq!(snapshot.cookies().len(), 1);
        assert!(snapshot.dom_exists(".container"));
        assert_eq!(snapshot.markup(), PAGE);
    }

    #[test]
    fn test_explicit_scope_overrides_inference() {
        let scope: HashSet<String> = HashSet::from(["jQuery".to_string()]);
        let context = PageContext::new("https://shop.example.com/", PAGE).with_scope(&scope);
        let snapshot = HtmlSnapshotExtractor::new().extract(&context).unwrap();

        assert!(snapshot.has_global("jQuery"));
        assert!(!snapshot.has_global("dataLayer"));
    }

    #[test]
    fn test_missing_url_is_caller_fault() {
        let err = HtmlSnapshotExtractor::new()
            .extract(&PageContext::new("", PAGE))
            .unwrap_err();
        assert!(matches!(err, TechDetectorError::SnapshotUnavailable(_)));

        let err = HtmlSnapshotExtractor::new()
            .extract(&PageContext::new("::not-a-url", PAGE))
            .unwrap_err();
        assert!(matches!(err, TechDetectorError::UrlError(_)));
    }
}
