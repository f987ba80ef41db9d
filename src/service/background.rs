//! 后台服务：处理消息请求，协调检测、缓存与徽标

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::message::{Request, Response};
use super::policy::{ensure_allowed, is_restricted_url};
use crate::cache::{now_millis, CachedPage, ResultCache};
use crate::detector::TechDetector;
use crate::error::{TdResult, TechDetectorError};
use crate::extractor::{PageContext, SnapshotExtractor};
use crate::rule::DetectionResult;
use crate::surface::Badge;

/// 提取URL中的主机名
pub fn hostname_of(url: &str) -> TdResult<String> {
    let parsed = Url::parse(url)?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| TechDetectorError::InvalidInput(format!("URL缺少主机名：{}", url)))
}

/// 后台服务
#[derive(Debug)]
pub struct BackgroundService {
    detector: TechDetector,
    cache: Mutex<ResultCache>,
}

impl BackgroundService {
    pub fn new(detector: TechDetector) -> Self {
        let cache = ResultCache::from_config(detector.config());
        Self {
            detector,
            cache: Mutex::new(cache),
        }
    }

    pub fn detector(&self) -> &TechDetector {
        &self.detector
    }

    /// 处理单个请求，错误统一转为失败响应
    pub async fn handle(&self, request: Request) -> Response {
        let outcome = match request {
            Request::UpdateDetectionResults { url, title, results } => {
                self.update_results(&url, title, results).await.map(|_| Response::ok())
            }
            Request::GetStoredResults { hostname } => {
                let cache = self.cache.lock().await;
                Ok(Response::with_data(cache.get(&hostname).cloned()))
            }
            Request::ClearStorageForDomain { hostname } => {
                let removed = self.cache.lock().await.remove(&hostname);
                debug!("清除域名缓存：{}，存在={}", hostname, removed.is_some());
                Ok(Response::ok())
            }
            Request::GetDetectionResults { url } => self.stored_results(&url).await.map(Response::with_results),
        };

        outcome.unwrap_or_else(|e| {
            debug!("请求处理失败：{}", e);
            Response::failure(e.to_string())
        })
    }

    /// 处理 JSON 编码的请求，返回 JSON 编码的响应
    pub async fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<Request>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                debug!("无法解析的请求：{}", e);
                Response::unknown_action()
            }
        };
        serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"success":false,"error":"Unknown action"}"#.to_string())
    }

    async fn update_results(
        &self,
        url: &str,
        title: Option<String>,
        results: Vec<DetectionResult>,
    ) -> TdResult<()> {
        ensure_allowed(url)?;
        let hostname = hostname_of(url)?;
        let page = CachedPage::new(url, title, results, now_millis()?);
        self.cache.lock().await.store(hostname, page);
        Ok(())
    }

    async fn stored_results(&self, url: &str) -> TdResult<Vec<DetectionResult>> {
        ensure_allowed(url)?;
        let hostname = hostname_of(url)?;
        let cache = self.cache.lock().await;
        cache
            .get(&hostname)
            .map(|page| page.results.clone())
            .ok_or_else(|| TechDetectorError::SnapshotUnavailable(format!("{}尚无检测结果", hostname)))
    }

    /// 分析页面：受限检查 -> 新鲜缓存命中 -> 提取快照并检测 -> 写入缓存
    pub async fn analyze(
        &self,
        context: &PageContext<'_>,
        extractor: &dyn SnapshotExtractor,
    ) -> TdResult<Vec<DetectionResult>> {
        ensure_allowed(context.url)?;
        let hostname = hostname_of(context.url)?;
        let now = now_millis()?;

        if let Some(page) = self.cache.lock().await.get_fresh(&hostname, now) {
            debug!("命中新鲜缓存：{}", hostname);
            return Ok(page.results.clone());
        }

        // 提取与检测期间不持有缓存锁；快照在重新加锁前释放
        let (results, title) = {
            let snapshot = extractor.extract(context)?;
            let results = self.detector.detect(&snapshot);
            let title = Some(snapshot.title().to_string()).filter(|title| !title.is_empty());
            (results, title)
        };
        info!("页面{}检测到{}项技术", context.url, results.len());

        self.cache
            .lock()
            .await
            .store(hostname, CachedPage::new(context.url, title, results.clone(), now));
        Ok(results)
    }

    /// 页面徽标；受限页面或无结果时清空
    pub async fn badge_for(&self, url: &str) -> Badge {
        if is_restricted_url(url) {
            return Badge::cleared();
        }
        let Ok(hostname) = hostname_of(url) else {
            return Badge::cleared();
        };
        let cache = self.cache.lock().await;
        cache
            .get(&hostname)
            .map(|page| Badge::from_count(page.results.len()))
            .unwrap_or_else(Badge::cleared)
    }

    /// 清理过期条目
    pub async fn sweep(&self) -> TdResult<usize> {
        let now = now_millis()?;
        Ok(self.cache.lock().await.sweep(now))
    }

    /// 周期清理，直到任务被取消
    pub async fn run_sweeper(self: Arc<Self>) {
        // interval 不接受零间隔
        let period = self.detector.config().sweep_interval.max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match self.sweep().await {
                Ok(removed) if removed > 0 => info!("周期清理完成，移除{}个过期条目", removed),
                Ok(_) => {}
                Err(e) => warn!("周期清理失败：{}", e),
            }
        }
    }

    /// 将缓存写入配置的缓存文件
    pub async fn persist(&self) -> TdResult<()> {
        let path = &self.detector.config().cache_path;
        self.cache.lock().await.save(path).await
    }

    /// 从配置的缓存文件恢复
    pub async fn restore(&self) -> TdResult<usize> {
        let config = self.detector.config();
        let restored = ResultCache::load(&config.cache_path, config.fresh_ttl, config.retention).await?;
        let count = restored.len();
        *self.cache.lock().await = restored;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{HtmlSnapshotExtractor, PageSnapshot};
    use crate::rule::SignatureCatalog;
    use crate::config::ConfigManager;

    fn service() -> BackgroundService {
        BackgroundService::new(TechDetector::with_catalog(
            SignatureCatalog::builtin(),
            ConfigManager::get_default(),
        ))
    }

    #[test]
    fn test_hostname_of() {
        assert_eq!(hostname_of("https://www.example.com:8443/a?b").unwrap(), "www.example.com");
        assert!(hostname_of("not a url").is_err());
    }

    #[tokio::test]
    async fn test_analyze_restricted_never_detects() {
        let service = service();
        let err = service
            .analyze(&PageContext::new("chrome://settings", "<html></html>"), &HtmlSnapshotExtractor)
            .await
            .unwrap_err();
        assert!(matches!(err, TechDetectorError::RestrictedContext(_)));
        assert_eq!(service.badge_for("chrome://settings").await, Badge::cleared());
    }

    #[tokio::test]
    async fn test_analyze_stores_and_badges() {
        let service = service();
        let html = r#"<html><head><title>Blog</title>
            <link rel="stylesheet" href="/wp-content/themes/x/style.css"></head></html>"#;
        let results = service
            .analyze(&PageContext::new("https://blog.example.com/", html), &HtmlSnapshotExtractor)
            .await
            .unwrap();
        assert!(results.iter().any(|r| r.name == "WordPress"));

        let response = service
            .handle(Request::GetStoredResults { hostname: "blog.example.com".to_string() })
            .await;
        let data = response.data.unwrap();
        assert_eq!(data.title.as_deref(), Some("Blog"));
        assert_eq!(data.results, results);

        let badge = service.badge_for("https://blog.example.com/other").await;
        assert_eq!(badge, Badge::from_count(results.len()));
    }

    /// 提取时确认缓存锁空闲的提取器
    struct LockCheckingExtractor<'a> {
        cache: &'a Mutex<ResultCache>,
    }

    impl SnapshotExtractor for LockCheckingExtractor<'_> {
        fn extract(&self, context: &PageContext<'_>) -> TdResult<PageSnapshot> {
            assert!(self.cache.try_lock().is_ok(), "提取期间缓存锁被占用");
            HtmlSnapshotExtractor.extract(context)
        }
    }

    #[tokio::test]
    async fn test_analyze_releases_cache_during_extraction() {
        let service = service();
        let extractor = LockCheckingExtractor { cache: &service.cache };
        let html = r#"<html><head><title>Shop</title>
            <script src="/js/jquery.min.js"></script></head></html>"#;

        let results = service
            .analyze(&PageContext::new("https://shop.example.com/", html), &extractor)
            .await
            .unwrap();
        assert!(results.iter().any(|r| r.name == "jQuery"));

        let stored = service.cache.lock().await.get("shop.example.com").cloned().unwrap();
        assert_eq!(stored.title.as_deref(), Some("Shop"));
        assert_eq!(stored.results, results);
    }

    #[tokio::test]
    async fn test_handle_json_unknown_action() {
        let service = service();
        let reply = service.handle_json(r#"{"action": "selfDestruct"}"#).await;
        assert_eq!(reply, r#"{"success":false,"error":"Unknown action"}"#);
        let reply = service.handle_json("not json").await;
        assert_eq!(reply, r#"{"success":false,"error":"Unknown action"}"#);
    }
}
