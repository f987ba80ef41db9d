//! 检测器核心：对每个签名运行分析器与附加分规则，输出排序后的检测结果
use std::sync::Arc;

use tracing::debug;

use super::analyzer::analyze_all;
use super::bonus::bonus_for;
use crate::config::GlobalConfig;
use crate::error::TdResult;
use crate::extractor::{HtmlSnapshotExtractor, PageContext, PageSnapshot, SnapshotExtractor};
use crate::rule::{CatalogLoader, DetectionResult, SignatureCatalog};
use crate::service::ensure_allowed;
use crate::utils::{DetectionUpdater, ScoreCard};

/// 对快照运行整个签名目录
///
/// 结果只包含置信度大于0的技术，按置信度降序排列，同分保持目录顺序。
pub fn detect(snapshot: &PageSnapshot, catalog: &SignatureCatalog) -> Vec<DetectionResult> {
    let mut results = Vec::new();

    for signature in catalog {
        let mut card = ScoreCard::new();
        analyze_all(signature, snapshot, &mut card);
        card.add_bonus(bonus_for(&signature.name, snapshot));

        if let Some(result) = DetectionUpdater::finalize(signature, card) {
            debug!(
                "检测到技术：{}，置信度={}，原因={:?}",
                result.name, result.confidence, result.matches
            );
            results.push(result);
        }
    }

    DetectionUpdater::rank(&mut results);
    debug!(
        "检测完成：url={}，签名数={}，命中技术数={}",
        snapshot.url(),
        catalog.len(),
        results.len()
    );
    results
}

/// 技术检测器
#[derive(Debug, Clone)]
pub struct TechDetector {
    catalog: Arc<SignatureCatalog>,
    config: GlobalConfig,
}

impl TechDetector {
    /// 创建检测器（按配置加载签名目录）
    pub async fn new(config: GlobalConfig) -> TdResult<Self> {
        let catalog = CatalogLoader::load(&config).await?;
        Ok(Self { catalog, config })
    }

    /// 使用已加载的签名目录创建检测器
    pub fn with_catalog(catalog: Arc<SignatureCatalog>, config: GlobalConfig) -> Self {
        Self { catalog, config }
    }

    /// 对快照执行检测
    pub fn detect(&self, snapshot: &PageSnapshot) -> Vec<DetectionResult> {
        detect(snapshot, &self.catalog)
    }

    /// 由页面HTML提取快照并检测，受限页面返回 `RestrictedContext`
    pub fn detect_html(&self, url: &str, html: &str) -> TdResult<Vec<DetectionResult>> {
        ensure_allowed(url)?;
        let snapshot = HtmlSnapshotExtractor::new().extract(&PageContext::new(url, html))?;
        Ok(self.detect(&snapshot))
    }

    pub fn catalog(&self) -> &Arc<SignatureCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }
}
