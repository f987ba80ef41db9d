//! 检测结果缓存管理
//! 以主机名为键保存每个页面的最近一次检测结果，支持新鲜度判断、过期清理和 MessagePack 持久化

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{GlobalConfig, DEFAULT_FRESH_TTL, DEFAULT_RETENTION};
use crate::error::{TdResult, TechDetectorError};
use crate::rule::DetectionResult;

/// 缓存数据格式版本
pub const DETECTION_VERSION: &str = "2.0";

/// 当前时间（UNIX 毫秒）
pub fn now_millis() -> TdResult<u64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// 单个页面的缓存条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPage {
    pub results: Vec<DetectionResult>,
    /// 写入时间（UNIX 毫秒）
    pub timestamp: u64,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_detection_version")]
    pub detection_version: String,
}

fn default_detection_version() -> String {
    DETECTION_VERSION.to_string()
}

impl CachedPage {
    pub fn new(url: impl Into<String>, title: Option<String>, results: Vec<DetectionResult>, timestamp: u64) -> Self {
        Self {
            results,
            timestamp,
            url: url.into(),
            title,
            detection_version: default_detection_version(),
        }
    }

    /// 条目年龄（毫秒）；时钟回拨时视为0
    pub fn age_millis(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }
}

/// 检测结果缓存
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: HashMap<String, CachedPage>,
    fresh_ttl: Duration,
    retention: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESH_TTL, DEFAULT_RETENTION)
    }
}

impl ResultCache {
    pub fn new(fresh_ttl: Duration, retention: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            fresh_ttl,
            retention,
        }
    }

    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.fresh_ttl, config.retention)
    }

    /// 写入条目，同主机名覆盖
    pub fn store(&mut self, hostname: impl Into<String>, page: CachedPage) {
        let hostname = hostname.into();
        debug!("缓存检测结果：{}，技术数：{}", hostname, page.results.len());
        self.entries.insert(hostname, page);
    }

    pub fn get(&self, hostname: &str) -> Option<&CachedPage> {
        self.entries.get(hostname)
    }

    /// 仅返回新鲜度阈值内的条目
    pub fn get_fresh(&self, hostname: &str, now: u64) -> Option<&CachedPage> {
        let ttl = duration_millis(self.fresh_ttl);
        self.entries
            .get(hostname)
            .filter(|page| page.age_millis(now) < ttl)
    }

    pub fn remove(&mut self, hostname: &str) -> Option<CachedPage> {
        self.entries.remove(hostname)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清理超过保留窗口的条目，返回清理数量
    pub fn sweep(&mut self, now: u64) -> usize {
        let retention = duration_millis(self.retention);
        let before = self.entries.len();
        self.entries.retain(|_, page| page.age_millis(now) <= retention);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("清理过期缓存条目：{}个", removed);
        }
        removed
    }

    /// 持久化到本地文件（MessagePack，字段名保留）
    pub async fn save(&self, path: &Path) -> TdResult<()> {
        let data = rmp_serde::to_vec_named(&self.entries)
            .map_err(|e| TechDetectorError::MsgPackError(format!("序列化失败：{}", e)))?;
        debug!("结果缓存序列化成功，条目数：{}，数据大小：{} 字节", self.entries.len(), data.len());

        tokio::fs::write(path, data).await.map_err(|e| {
            TechDetectorError::CacheError(format!("写入{}失败：{}", path.display(), e))
        })
    }

    /// 从本地文件恢复；文件不存在时返回空缓存，结构无效的条目被丢弃
    pub async fn load(path: &Path, fresh_ttl: Duration, retention: Duration) -> TdResult<Self> {
        let mut cache = Self::new(fresh_ttl, retention);
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("缓存文件{}不存在，使用空缓存", path.display());
                return Ok(cache);
            }
            Err(e) => {
                return Err(TechDetectorError::CacheError(format!(
                    "读取{}失败：{}",
                    path.display(),
                    e
                )));
            }
        };

        let raw: HashMap<String, serde_json::Value> = rmp_serde::from_slice(&data)
            .map_err(|e| TechDetectorError::MsgPackError(format!("反序列化失败：{}", e)))?;

        let mut reclaimed = 0usize;
        for (hostname, value) in raw {
            match serde_json::from_value::<CachedPage>(value) {
                Ok(page) => {
                    cache.entries.insert(hostname, page);
                }
                Err(e) => {
                    reclaimed += 1;
                    debug!("丢弃无效缓存条目{}：{}", hostname, e);
                }
            }
        }
        if reclaimed > 0 {
            warn!("缓存文件{}中有{}个无效条目已被回收", path.display(), reclaimed);
        }
        debug!("结果缓存恢复完成，有效条目数：{}", cache.entries.len());

        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: u64 = 60 * 1000;
    const HOUR: u64 = 60 * MINUTE;

    fn page(timestamp: u64) -> CachedPage {
        let result = DetectionResult {
            name: "jQuery".to_string(),
            category: "JavaScript Library".to_string(),
            icon: "$".to_string(),
            confidence: 55,
            matches: vec!["HTML content".to_string()],
        };
        CachedPage::new("https://example.com/", Some("Example".to_string()), vec![result], timestamp)
    }

    #[test]
    fn test_fresh_threshold() {
        let mut cache = ResultCache::default();
        let t0 = 1_700_000_000_000;
        cache.store("example.com", page(t0));

        assert!(cache.get_fresh("example.com", t0 + 29_999).is_some());
        assert!(cache.get_fresh("example.com", t0 + 30_000).is_none());
        // 过期但仍在保留窗口内
        assert!(cache.get("example.com").is_some());
        assert!(cache.get_fresh("unknown.org", t0).is_none());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let mut cache = ResultCache::default();
        let now = 1_700_000_000_000;
        cache.store("old.com", page(now - 25 * HOUR));
        cache.store("edge.com", page(now - 24 * HOUR));
        cache.store("new.com", page(now - MINUTE));

        assert_eq!(cache.sweep(now), 1);
        assert!(cache.get("old.com").is_none());
        assert!(cache.get("edge.com").is_some());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.sweep(now), 0);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = ResultCache::default();
        cache.store("a.com", page(1));
        cache.store("b.com", page(2));
        assert!(cache.remove("a.com").is_some());
        assert!(cache.remove("a.com").is_none());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.mp");

        let mut cache = ResultCache::default();
        cache.store("example.com", page(42));
        cache.save(&path).await.unwrap();

        let restored = ResultCache::load(&path, DEFAULT_FRESH_TTL, DEFAULT_RETENTION)
            .await
            .unwrap();
        assert_eq!(restored.get("example.com"), Some(&page(42)));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::load(&dir.path().join("absent.mp"), DEFAULT_FRESH_TTL, DEFAULT_RETENTION)
            .await
            .unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_load_reclaims_invalid_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.mp");

        let mut raw: HashMap<String, serde_json::Value> = HashMap::new();
        raw.insert("good.com".to_string(), serde_json::to_value(page(7)).unwrap());
        raw.insert("bad.com".to_string(), serde_json::json!("not an object"));
        raw.insert("partial.com".to_string(), serde_json::json!({ "url": "https://partial.com/" }));
        tokio::fs::write(&path, rmp_serde::to_vec_named(&raw).unwrap())
            .await
            .unwrap();

        let cache = ResultCache::load(&path, DEFAULT_FRESH_TTL, DEFAULT_RETENTION)
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.get("good.com").is_some());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.mp");
        tokio::fs::write(&path, b"\xc1\xc1\xc1").await.unwrap();

        let err = ResultCache::load(&path, DEFAULT_FRESH_TTL, DEFAULT_RETENTION)
            .await
            .unwrap_err();
        assert!(matches!(err, TechDetectorError::MsgPackError(_)));
    }
}
