//! 页面快照：单次检测使用的不可变页面信号集合

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{TdResult, TechDetectorError};

/// 脚本/样式条目：外链地址或内联文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEntry {
    Url(String),
    Inline(String),
}

impl ResourceEntry {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceEntry::Url(s) | ResourceEntry::Inline(s) => s,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ResourceEntry::Inline(_))
    }
}

/// 可查询的 DOM 文档
#[derive(Clone)]
pub struct DomDocument {
    html: Html,
}

impl DomDocument {
    /// 解析HTML为DOM
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// 选择器是否命中至少一个元素；选择器无效时返回错误
    pub fn matches(&self, selector: &str) -> TdResult<bool> {
        let parsed = Selector::parse(selector).map_err(|e| {
            TechDetectorError::InvalidSelector(format!("{}：{:?}", selector, e))
        })?;
        Ok(self.html.select(&parsed).next().is_some())
    }

    /// 宽松版本：无效选择器视为未命中
    pub fn exists(&self, selector: &str) -> bool {
        self.matches(selector).unwrap_or(false)
    }
}

impl fmt::Debug for DomDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomDocument").finish_non_exhaustive()
    }
}

/// 页面快照
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    markup: String,
    url: String,
    title: String,
    meta: BTreeMap<String, String>,
    scripts: Vec<ResourceEntry>,
    stylesheets: Vec<ResourceEntry>,
    globals: BTreeSet<String>,
    header_hints: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    dom: Option<DomDocument>,
    service_worker: bool,
}

impl PageSnapshot {
    pub fn builder() -> PageSnapshotBuilder {
        PageSnapshotBuilder::default()
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 小写 meta 名称 -> 内容
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn scripts(&self) -> &[ResourceEntry] {
        &self.scripts
    }

    pub fn stylesheets(&self) -> &[ResourceEntry] {
        &self.stylesheets
    }

    pub fn globals(&self) -> &BTreeSet<String> {
        &self.globals
    }

    pub fn has_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }

    /// 仅来自页面标记的响应头线索，并非真实响应头
    pub fn header_hints(&self) -> &BTreeMap<String, String> {
        &self.header_hints
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn dom(&self) -> Option<&DomDocument> {
        self.dom.as_ref()
    }

    /// DOM 中是否存在匹配元素（无 DOM 时为 false）
    pub fn dom_exists(&self, selector: &str) -> bool {
        self.dom.as_ref().is_some_and(|dom| dom.exists(selector))
    }

    pub fn service_worker(&self) -> bool {
        self.service_worker
    }

    /// 页面主机名（URL 无法解析时为 None）
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// 页面是否通过 https 加载
    pub fn is_secure(&self) -> bool {
        Url::parse(&self.url).is_ok_and(|url| url.scheme() == "https")
    }
}

/// 快照构建器
#[derive(Debug, Default)]
pub struct PageSnapshotBuilder {
    snapshot: PageSnapshot,
}

impl PageSnapshotBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.snapshot.url = url.into();
        self
    }

    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.snapshot.markup = markup.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.snapshot.title = title.into();
        self
    }

    /// 添加 meta，名称统一小写，同名后者覆盖前者
    pub fn meta(mut self, name: impl AsRef<str>, content: impl Into<String>) -> Self {
        self.snapshot
            .meta
            .insert(name.as_ref().to_lowercase(), content.into());
        self
    }

    pub fn metas(mut self, meta: BTreeMap<String, String>) -> Self {
        for (name, content) in meta {
            self = self.meta(name, content);
        }
        self
    }

    pub fn script(mut self, entry: ResourceEntry) -> Self {
        self.snapshot.scripts.push(entry);
        self
    }

    pub fn script_url(self, url: impl Into<String>) -> Self {
        self.script(ResourceEntry::Url(url.into()))
    }

    pub fn inline_script(self, body: impl Into<String>) -> Self {
        self.script(ResourceEntry::Inline(body.into()))
    }

    pub fn stylesheet(mut self, entry: ResourceEntry) -> Self {
        self.snapshot.stylesheets.push(entry);
        self
    }

    pub fn stylesheet_url(self, url: impl Into<String>) -> Self {
        self.stylesheet(ResourceEntry::Url(url.into()))
    }

    pub fn inline_style(self, body: impl Into<String>) -> Self {
        self.stylesheet(ResourceEntry::Inline(body.into()))
    }

    pub fn global(mut self, name: impl Into<String>) -> Self {
        self.snapshot.globals.insert(name.into());
        self
    }

    pub fn globals(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.snapshot.globals.extend(names);
        self
    }

    pub fn header_hint(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.snapshot
            .header_hints
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.snapshot.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookies(mut self, cookies: BTreeMap<String, String>) -> Self {
        self.snapshot.cookies.extend(cookies);
        self
    }

    pub fn dom(mut self, dom: DomDocument) -> Self {
        self.snapshot.dom = Some(dom);
        self
    }

    /// 以当前 markup 构建 DOM
    pub fn dom_from_markup(mut self) -> Self {
        self.snapshot.dom = Some(DomDocument::parse(&self.snapshot.markup));
        self
    }

    pub fn service_worker(mut self, supported: bool) -> Self {
        self.snapshot.service_worker = supported;
        self
    }

    pub fn build(self) -> PageSnapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_names_lowercased_last_writer_wins() {
        let snapshot = PageSnapshot::builder()
            .meta("Generator", "WordPress 6.0")
            .meta("generator", "WordPress 6.4")
            .build();

        assert_eq!(snapshot.meta().len(), 1);
        assert_eq!(snapshot.meta()["generator"], "WordPress 6.4");
    }

    #[test]
    fn test_url_helpers() {
        let snapshot = PageSnapshot::builder()
            .url("https://www.youtube.com/watch?v=1")
            .build();
        assert_eq!(snapshot.hostname().as_deref(), Some("www.youtube.com"));
        assert!(snapshot.is_secure());

        let snapshot = PageSnapshot::builder().url("not a url").build();
        assert_eq!(snapshot.hostname(), None);
        assert!(!snapshot.is_secure());
    }

    #[test]
    fn test_dom_queries() {
        let snapshot = PageSnapshot::builder()
            .markup(r#"<html><head><link rel="manifest" href="/m.json"></head><body></body></html>"#)
            .dom_from_markup()
            .build();

        assert!(snapshot.dom_exists(r#"link[rel="manifest"]"#));
        assert!(!snapshot.dom_exists("ytd-app"));

        let dom = snapshot.dom().unwrap();
        assert!(dom.matches("##").is_err());
        assert!(!dom.exists("##"));
    }

    #[test]
    fn test_without_dom_every_selector_misses() {
        let snapshot = PageSnapshot::builder().markup("<div id=player></div>").build();
        assert!(snapshot.dom().is_none());
        assert!(!snapshot.dom_exists("#player"));
    }
}
