//! 检测结果更新工具
//! 负责单个签名的分值累加、命中原因去重，以及结果的生成与排序

use crate::compiler::{CompiledSignature, MatchCategory};
use crate::rule::DetectionResult;

/// 置信度上限
pub const MAX_CONFIDENCE: u8 = 100;

/// 单个签名的评分卡
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreCard {
    raw: u32,
    reasons: Vec<&'static str>,
}

impl ScoreCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录某类别的命中：每次命中累加固定分值，原因标签只记录首次出现
    pub fn record(&mut self, category: MatchCategory, hits: usize) {
        if hits == 0 {
            return;
        }
        let hits = u32::try_from(hits).unwrap_or(u32::MAX);
        self.raw = self
            .raw
            .saturating_add(category.points().saturating_mul(hits));

        let reason = category.reason();
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    /// 附加分不产生原因标签
    pub fn add_bonus(&mut self, points: u32) {
        self.raw = self.raw.saturating_add(points);
    }

    /// 未截断的原始累计分
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// 截断后的置信度
    pub fn confidence(&self) -> u8 {
        self.raw.min(u32::from(MAX_CONFIDENCE)) as u8
    }

    pub fn reasons(&self) -> &[&'static str] {
        &self.reasons
    }
}

/// 检测结果更新工具
pub struct DetectionUpdater;

impl DetectionUpdater {
    /// 评分卡转为检测结果；置信度为0时不产生结果
    pub fn finalize(signature: &CompiledSignature, card: ScoreCard) -> Option<DetectionResult> {
        let confidence = card.confidence();
        if confidence == 0 {
            return None;
        }

        Some(DetectionResult {
            name: signature.name.clone(),
            category: signature.category.clone(),
            icon: signature.icon.clone(),
            confidence,
            matches: card.reasons.into_iter().map(str::to_string).collect(),
        })
    }

    /// 按置信度降序排序，同分保持原有顺序
    pub fn rank(results: &mut [DetectionResult]) {
        results.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    }
}
