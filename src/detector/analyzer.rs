//! 检测分析器：按信号类别对单个签名计算命中次数
//! 每个匹配器对每个目标独立计数，不做提前退出
use regex::Regex;
use tracing::debug;

use crate::compiler::{CompiledSignature, MatchCategory};
use crate::extractor::PageSnapshot;
use crate::utils::ScoreCard;

/// 类别分析器
pub trait Analyzer {
    const CATEGORY: MatchCategory;

    /// 签名在该类别下的命中次数（未声明该类别时为0）
    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize;

    /// 计算命中并写入评分卡
    fn analyze(signature: &CompiledSignature, snapshot: &PageSnapshot, card: &mut ScoreCard) {
        let hits = Self::hits(signature, snapshot);
        if hits > 0 {
            debug!(
                "{}匹配成功：技术={}，命中{}次",
                Self::CATEGORY,
                signature.name,
                hits
            );
            card.record(Self::CATEGORY, hits);
        }
    }
}

/// 每个正则对每个目标单独计数
fn count_regex_hits<'a, I>(patterns: &[Regex], targets: I) -> usize
where
    I: Iterator<Item = &'a str> + Clone,
{
    patterns
        .iter()
        .map(|regex| targets.clone().filter(|target| regex.is_match(target)).count())
        .sum()
}

/// 键值对目标：键或值任一命中即计一次
fn count_pair_hits<'a, I>(patterns: &[Regex], pairs: I) -> usize
where
    I: Iterator<Item = (&'a String, &'a String)> + Clone,
{
    patterns
        .iter()
        .map(|regex| {
            pairs
                .clone()
                .filter(|(name, value)| regex.is_match(name) || regex.is_match(value))
                .count()
        })
        .sum()
}

/// HTML分析器
pub struct HtmlAnalyzer;

impl Analyzer for HtmlAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Html;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let Some(patterns) = &signature.html_patterns else {
            return 0;
        };
        count_regex_hits(patterns, std::iter::once(snapshot.markup()))
    }
}

/// Script分析器
pub struct ScriptAnalyzer;

impl Analyzer for ScriptAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Script;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let Some(patterns) = &signature.script_patterns else {
            return 0;
        };
        count_regex_hits(patterns, snapshot.scripts().iter().map(|entry| entry.as_str()))
    }
}

/// 样式表分析器
pub struct StylesheetAnalyzer;

impl Analyzer for StylesheetAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Stylesheet;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let Some(patterns) = &signature.css_patterns else {
            return 0;
        };
        count_regex_hits(patterns, snapshot.stylesheets().iter().map(|entry| entry.as_str()))
    }
}

/// 全局变量分析器
pub struct GlobalAnalyzer;

impl Analyzer for GlobalAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Global;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let Some(names) = &signature.global_names else {
            return 0;
        };
        names.iter().filter(|name| snapshot.has_global(name)).count()
    }
}

/// DOM分析器
pub struct DomAnalyzer;

impl Analyzer for DomAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Dom;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let (Some(selectors), Some(dom)) = (&signature.dom_selectors, snapshot.dom()) else {
            return 0;
        };
        selectors
            .iter()
            .filter(|selector| match dom.matches(selector) {
                Ok(found) => found,
                Err(e) => {
                    debug!("技术={}的DOM选择器无效，跳过：{}", signature.name, e);
                    false
                }
            })
            .count()
    }
}

/// Meta分析器
pub struct MetaAnalyzer;

impl Analyzer for MetaAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Meta;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let Some(patterns) = &signature.meta_patterns else {
            return 0;
        };
        count_pair_hits(patterns, snapshot.meta().iter())
    }
}

/// Header线索分析器
pub struct HeaderAnalyzer;

impl Analyzer for HeaderAnalyzer {
    const CATEGORY: MatchCategory = MatchCategory::Header;

    fn hits(signature: &CompiledSignature, snapshot: &PageSnapshot) -> usize {
        let Some(patterns) = &signature.header_patterns else {
            return 0;
        };
        count_pair_hits(patterns, snapshot.header_hints().iter())
    }
}

/// 按固定顺序运行全部类别分析器
pub fn analyze_all(signature: &CompiledSignature, snapshot: &PageSnapshot, card: &mut ScoreCard) {
    HtmlAnalyzer::analyze(signature, snapshot, card);
    ScriptAnalyzer::analyze(signature, snapshot, card);
    StylesheetAnalyzer::analyze(signature, snapshot, card);
    GlobalAnalyzer::analyze(signature, snapshot, card);
    DomAnalyzer::analyze(signature, snapshot, card);
    MetaAnalyzer::analyze(signature, snapshot, card);
    HeaderAnalyzer::analyze(signature, snapshot, card);
}
