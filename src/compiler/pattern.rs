//! 编译后签名模型
//! 正则编译后的结构，以及信号类别的固定分值/命中原因

use std::fmt;
use std::str::FromStr;

use regex::Regex;

/// 信号类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchCategory {
    Html,
    Script,
    Stylesheet,
    Global,
    Dom,
    Meta,
    Header,
}

impl MatchCategory {
    /// 固定评估顺序
    pub const ALL: [MatchCategory; 7] = [
        MatchCategory::Html,
        MatchCategory::Script,
        MatchCategory::Stylesheet,
        MatchCategory::Global,
        MatchCategory::Dom,
        MatchCategory::Meta,
        MatchCategory::Header,
    ];

    /// 签名目录中使用的类别键
    pub fn key(self) -> &'static str {
        match self {
            MatchCategory::Html => "html",
            MatchCategory::Script => "scripts",
            MatchCategory::Stylesheet => "css",
            MatchCategory::Global => "globals",
            MatchCategory::Dom => "dom",
            MatchCategory::Meta => "meta",
            MatchCategory::Header => "headers",
        }
    }

    /// 单次命中的固定分值
    pub fn points(self) -> u32 {
        match self {
            MatchCategory::Html => 25,
            MatchCategory::Script => 30,
            MatchCategory::Stylesheet => 25,
            MatchCategory::Global => 35,
            MatchCategory::Dom => 20,
            MatchCategory::Meta => 30,
            MatchCategory::Header => 40,
        }
    }

    /// 命中原因标签
    pub fn reason(self) -> &'static str {
        match self {
            MatchCategory::Html => "HTML content",
            MatchCategory::Script => "Script source/content",
            MatchCategory::Stylesheet => "Stylesheet",
            MatchCategory::Global => "Global variable",
            MatchCategory::Dom => "DOM element",
            MatchCategory::Meta => "Meta tag",
            MatchCategory::Header => "HTTP header",
        }
    }
}

impl FromStr for MatchCategory {
    type Err = ();

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        MatchCategory::ALL
            .into_iter()
            .find(|category| category.key() == key)
            .ok_or(())
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 编译后的技术签名
///
/// 每个类别为 `None` 表示签名未声明该类别；声明了的类别至少包含一个匹配器。
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub name: String,
    pub category: String,
    pub icon: String,
    pub html_patterns: Option<Vec<Regex>>,
    pub script_patterns: Option<Vec<Regex>>,
    pub css_patterns: Option<Vec<Regex>>,
    pub global_names: Option<Vec<String>>,
    pub dom_selectors: Option<Vec<String>>,
    pub meta_patterns: Option<Vec<Regex>>,
    pub header_patterns: Option<Vec<Regex>>,
}

impl CompiledSignature {
    /// 创建不含任何模式的签名
    pub fn new(name: impl Into<String>, category: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            icon: icon.into(),
            html_patterns: None,
            script_patterns: None,
            css_patterns: None,
            global_names: None,
            dom_selectors: None,
            meta_patterns: None,
            header_patterns: None,
        }
    }

    /// 指定类别下的匹配器数量
    pub fn matcher_count(&self, category: MatchCategory) -> usize {
        match category {
            MatchCategory::Html => self.html_patterns.as_ref().map_or(0, Vec::len),
            MatchCategory::Script => self.script_patterns.as_ref().map_or(0, Vec::len),
            MatchCategory::Stylesheet => self.css_patterns.as_ref().map_or(0, Vec::len),
            MatchCategory::Global => self.global_names.as_ref().map_or(0, Vec::len),
            MatchCategory::Dom => self.dom_selectors.as_ref().map_or(0, Vec::len),
            MatchCategory::Meta => self.meta_patterns.as_ref().map_or(0, Vec::len),
            MatchCategory::Header => self.header_patterns.as_ref().map_or(0, Vec::len),
        }
    }

    /// 声明的类别列表（按固定评估顺序）
    pub fn declared_categories(&self) -> Vec<MatchCategory> {
        MatchCategory::ALL
            .into_iter()
            .filter(|category| self.matcher_count(*category) > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_key_round_trip() {
        for category in MatchCategory::ALL {
            assert_eq!(category.key().parse::<MatchCategory>(), Ok(category));
        }
        assert!("cookies".parse::<MatchCategory>().is_err());
    }

    #[test]
    fn test_declared_categories_follow_fixed_order() {
        let mut signature = CompiledSignature::new("Demo", "Misc", "D");
        signature.header_patterns = Some(vec![Regex::new("x").unwrap()]);
        signature.html_patterns = Some(vec![Regex::new("y").unwrap()]);

        assert_eq!(
            signature.declared_categories(),
            vec![MatchCategory::Html, MatchCategory::Header]
        );
        assert_eq!(signature.matcher_count(MatchCategory::Dom), 0);
    }
}
