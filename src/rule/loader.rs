//! 签名目录加载管理器
//! 负责从配置的本地文件或内置数据加载签名目录

use std::sync::Arc;

use tracing::debug;

use super::catalog::SignatureCatalog;
use crate::config::GlobalConfig;
use crate::error::{TdResult, TechDetectorError};

/// 签名目录加载管理器
pub struct CatalogLoader;

impl CatalogLoader {
    /// 加载签名目录（配置了路径则读取文件，否则使用内置目录）
    pub async fn load(config: &GlobalConfig) -> TdResult<Arc<SignatureCatalog>> {
        let Some(path) = &config.catalog_path else {
            debug!("未配置签名目录路径，使用内置签名目录");
            return Ok(SignatureCatalog::builtin());
        };

        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            TechDetectorError::CatalogLoadError(format!("读取{}失败：{}", path.display(), e))
        })?;
        let catalog = SignatureCatalog::from_json(&json)?;
        debug!("从{}加载签名目录成功，签名数：{}", path.display(), catalog.len());

        Ok(Arc::new(catalog))
    }
}
