//! 全局变量探测
//! 以固定的观察名单探测页面全局作用域，探测失败一律视为不存在

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::snapshot::ResourceEntry;
use crate::error::TdResult;

/// 全局变量观察名单
pub const GLOBAL_WATCH_LIST: &[&str] = &[
    "React",
    "Vue",
    "angular",
    "ng",
    "jQuery",
    "$",
    "ga",
    "gtag",
    "__gaTracker",
    "fbq",
    "Shopify",
    "wp",
    "wpdb",
    "__REACT_DEVTOOLS_GLOBAL_HOOK__",
    "__VUE__",
    "Polymer",
    "goog",
    "XRegExp",
    "Hammer",
    "lottie",
    "bodymovin",
    "google_tag_manager",
    "dataLayer",
    "Stripe",
    "paypal",
    "PAYPAL",
    "moment",
    "d3",
    "Chart",
    "_",
    "twttr",
    "__webpack_require__",
];

/// 页面全局作用域
pub trait GlobalScope {
    /// 名称是否存在于全局作用域
    fn probe(&self, name: &str) -> TdResult<bool>;
}

impl GlobalScope for HashSet<String> {
    fn probe(&self, name: &str) -> TdResult<bool> {
        Ok(self.contains(name))
    }
}

impl GlobalScope for BTreeSet<String> {
    fn probe(&self, name: &str) -> TdResult<bool> {
        Ok(self.contains(name))
    }
}

/// 空作用域
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGlobals;

impl GlobalScope for NoGlobals {
    fn probe(&self, _name: &str) -> TdResult<bool> {
        Ok(false)
    }
}

/// 基于内联脚本的声明推断全局变量（启发式，无脚本执行能力时使用）
#[derive(Debug, Clone, Default)]
pub struct DeclaredGlobals {
    names: HashSet<String>,
}

static DECLARATION_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // window.X = / self.X = / globalThis.X =
        r"\b(?:window|self|globalThis)\s*\.\s*([A-Za-z_$][\w$]*)\s*=[^=]",
        // window["X"] =
        r#"\b(?:window|self|globalThis)\s*\[\s*['"]([A-Za-z_$][\w$]*)['"]\s*\]\s*=[^=]"#,
        // var/let/const X
        r"(?:^|[;{}\s])(?:var|let|const)\s+([A-Za-z_$][\w$]*)",
        // function X(
        r"(?:^|[;{}\s])function\s+([A-Za-z_$][\w$]*)\s*\(",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

impl DeclaredGlobals {
    /// 从脚本条目中收集声明（仅扫描内联脚本）
    pub fn from_entries(entries: &[ResourceEntry]) -> Self {
        let mut names = HashSet::new();
        for entry in entries.iter().filter(|entry| entry.is_inline()) {
            for regex in DECLARATION_REGEXES.iter() {
                for captures in regex.captures_iter(entry.as_str()) {
                    if let Some(name) = captures.get(1) {
                        names.insert(name.as_str().to_string());
                    }
                }
            }
        }
        Self { names }
    }

    pub fn names(&self) -> &HashSet<String> {
        &self.names
    }
}

impl GlobalScope for DeclaredGlobals {
    fn probe(&self, name: &str) -> TdResult<bool> {
        Ok(self.names.contains(name))
    }
}

/// 按观察名单探测全局变量，探测失败的名称视为不存在
pub fn probe_watch_list(scope: &dyn GlobalScope) -> BTreeSet<String> {
    let mut observed = BTreeSet::new();
    for name in GLOBAL_WATCH_LIST {
        match scope.probe(name) {
            Ok(true) => {
                observed.insert((*name).to_string());
            }
            Ok(false) => {}
            Err(e) => debug!("全局变量[{}]探测失败，视为不存在：{}", name, e),
        }
    }
    observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TechDetectorError;

    struct FlakyScope;

    impl GlobalScope for FlakyScope {
        fn probe(&self, name: &str) -> TdResult<bool> {
            match name {
                "React" => Ok(true),
                "jQuery" => Err(TechDetectorError::ProbeError("getter threw".to_string())),
                _ => Ok(false),
            }
        }
    }

    #[test]
    fn test_probe_failures_are_absent() {
        let observed = probe_watch_list(&FlakyScope);
        assert_eq!(observed, BTreeSet::from(["React".to_string()]));
    }

    #[test]
    fn test_only_watch_list_names_are_reported() {
        let scope: HashSet<String> = ["Vue", "myAppState"].iter().map(|s| s.to_string()).collect();
        let observed = probe_watch_list(&scope);
        assert!(observed.contains("Vue"));
        assert!(!observed.contains("myAppState"));
    }

    #[test]
    fn test_declared_globals_from_inline_scripts() {
        let entries = vec![
            ResourceEntry::Url("https://cdn.example.com/moment.js".to_string()),
            ResourceEntry::Inline(
                "window.dataLayer = window.dataLayer || [];\nfunction gtag(){dataLayer.push(arguments);}"
                    .to_string(),
            ),
            ResourceEntry::Inline("var _ = {}; if (window.React == null) {}".to_string()),
        ];
        let scope = DeclaredGlobals::from_entries(&entries);
        let observed = probe_watch_list(&scope);

        assert!(observed.contains("dataLayer"));
        assert!(observed.contains("gtag"));
        assert!(observed.contains("_"));
        // 比较表达式不是声明
        assert!(!observed.contains("React"));
        // 外链脚本不参与推断
        assert!(!observed.contains("moment"));
    }
}
