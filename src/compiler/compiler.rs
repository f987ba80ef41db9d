//! 签名编译器核心
//! 负责将原始签名规则编译为可执行的匹配器，畸形类别/正则按条跳过

use std::collections::HashSet;
use std::time::Instant;

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use super::pattern::{CompiledSignature, MatchCategory};
use crate::error::{TdResult, TechDetectorError};
use crate::rule::SignatureRule;

/// 正则字面量允许的标志位
const LITERAL_FLAGS: &str = "dgimsuvy";

/// 签名编译器
pub struct SignatureCompiler;

impl SignatureCompiler {
    /// 编译整份签名目录（保持目录顺序）
    pub fn compile(rules: &[SignatureRule]) -> TdResult<Vec<CompiledSignature>> {
        let start = Instant::now();
        let mut seen = HashSet::with_capacity(rules.len());
        let mut stats = CompileStats::default();
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.name.trim().is_empty() {
                return Err(TechDetectorError::CatalogParseError(
                    "签名名称不能为空".to_string(),
                ));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(TechDetectorError::CatalogParseError(format!(
                    "签名名称重复：{}",
                    rule.name
                )));
            }
            compiled.push(Self::compile_signature(rule, &mut stats));
        }

        debug!(
            "✅ 签名编译完成，共{}条签名，耗时{:?}，跳过类别{}个、跳过正则{}条",
            compiled.len(),
            start.elapsed(),
            stats.skipped_categories,
            stats.skipped_patterns
        );

        Ok(compiled)
    }

    /// 编译单条签名
    fn compile_signature(rule: &SignatureRule, stats: &mut CompileStats) -> CompiledSignature {
        let mut signature = CompiledSignature::new(&rule.name, &rule.category, &rule.icon);

        for (key, value) in &rule.patterns {
            let Ok(category) = key.parse::<MatchCategory>() else {
                warn!("签名[{}]包含未知类别[{}]，已跳过", rule.name, key);
                stats.skipped_categories += 1;
                continue;
            };

            let Some(raw_items) = Self::string_items(value) else {
                warn!("签名[{}]的类别[{}]格式不受支持或为空，已跳过", rule.name, key);
                stats.skipped_categories += 1;
                continue;
            };

            match category {
                MatchCategory::Html => {
                    signature.html_patterns = Self::compile_regex_list(&rule.name, key, &raw_items, stats)
                }
                MatchCategory::Script => {
                    signature.script_patterns = Self::compile_regex_list(&rule.name, key, &raw_items, stats)
                }
                MatchCategory::Stylesheet => {
                    signature.css_patterns = Self::compile_regex_list(&rule.name, key, &raw_items, stats)
                }
                MatchCategory::Meta => {
                    signature.meta_patterns = Self::compile_regex_list(&rule.name, key, &raw_items, stats)
                }
                MatchCategory::Header => {
                    signature.header_patterns = Self::compile_regex_list(&rule.name, key, &raw_items, stats)
                }
                MatchCategory::Global => signature.global_names = Some(raw_items),
                // 选择器合法性在匹配阶段判断
                MatchCategory::Dom => signature.dom_selectors = Some(raw_items),
            }
        }

        signature
    }

    /// 将字符串/字符串数组统一为非空列表
    fn string_items(value: &Value) -> Option<Vec<String>> {
        let items: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(arr) => arr
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => return None,
        };

        if items.is_empty() { None } else { Some(items) }
    }

    /// 编译正则列表，编译失败的单条正则被跳过
    fn compile_regex_list(
        tech_name: &str,
        key: &str,
        raw_items: &[String],
        stats: &mut CompileStats,
    ) -> Option<Vec<Regex>> {
        let mut patterns = Vec::with_capacity(raw_items.len());
        for raw in raw_items {
            match Self::compile_single_pattern(raw) {
                Ok(regex) => patterns.push(regex),
                Err(e) => {
                    warn!("签名[{}]的{}正则[{}]编译失败：{}", tech_name, key, raw, e);
                    stats.skipped_patterns += 1;
                }
            }
        }

        if patterns.is_empty() {
            stats.skipped_categories += 1;
            None
        } else {
            Some(patterns)
        }
    }

    /// 编译单个正则（支持 `/body/flags` 字面量写法）
    pub fn compile_single_pattern(raw_pattern: &str) -> TdResult<Regex> {
        let (body, flags) = Self::split_literal(raw_pattern);
        let body = Self::clean_slash_escapes(body);

        let regex = RegexBuilder::new(&body)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()?;
        Ok(regex)
    }

    /// 拆分正则字面量：移除分隔符并取出标志位
    /// 尾段不是合法标志位时（如 `/static/js`）按普通字符串整体编译
    fn split_literal(raw: &str) -> (&str, &str) {
        if raw.len() >= 2 && raw.starts_with('/') {
            if let Some(end) = raw.rfind('/') {
                let flags = &raw[end + 1..];
                if end > 0 && Self::is_flag_set(flags) {
                    return (&raw[1..end], flags);
                }
            }
        }
        (raw, "")
    }

    /// 标志位只能由 `dgimsuvy` 组成且不重复
    fn is_flag_set(flags: &str) -> bool {
        let mut seen = HashSet::with_capacity(flags.len());
        flags
            .chars()
            .all(|c| LITERAL_FLAGS.contains(c) && seen.insert(c))
    }

    /// 清理字面量中的 `\/` 转义
    fn clean_slash_escapes(body: &str) -> String {
        let mut cleaned = String::with_capacity(body.len());
        let mut chars = body.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\\' {
                cleaned.push(c);
                continue;
            }
            match chars.next() {
                Some('/') => cleaned.push('/'),
                Some(next_c) => {
                    cleaned.push(c);
                    cleaned.push(next_c);
                }
                None => cleaned.push(c),
            }
        }

        cleaned
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    skipped_categories: usize,
    skipped_patterns: usize,
}
