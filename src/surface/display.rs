//! 结果展示：按分类分组并渲染纯文本

use std::fmt::Write;

use crate::rule::DetectionResult;

/// 无结果时的提示文本
pub const EMPTY_STATE_MESSAGE: &str = "No technologies detected on this page.";

/// 分类分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub technologies: Vec<&'a DetectionResult>,
}

/// 按分类分组，分类按首次出现顺序排列，组内保持输入顺序
pub fn group_by_category(results: &[DetectionResult]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|group| group.category == result.category) {
            Some(group) => group.technologies.push(result),
            None => groups.push(CategoryGroup {
                category: &result.category,
                technologies: vec![result],
            }),
        }
    }
    groups
}

/// 渲染分组后的纯文本
pub fn render_text(results: &[DetectionResult]) -> String {
    if results.is_empty() {
        return EMPTY_STATE_MESSAGE.to_string();
    }

    let mut out = String::new();
    for (index, group) in group_by_category(results).iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", group.category);
        for tech in &group.technologies {
            let _ = writeln!(out, "  {} {}", tech.icon, tech.name);
            let _ = writeln!(out, "    Confidence: {}%", tech.confidence);
            if !tech.matches.is_empty() {
                let _ = writeln!(out, "    Detected via: {}", tech.matches.join(", "));
            }
        }
    }
    out
}
