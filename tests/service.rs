//! 后台服务消息处理与缓存持久化

use techdetector::{
    BackgroundService, Badge, BadgeTier, ConfigManager, HtmlSnapshotExtractor, PageContext, Request, SignatureCatalog,
    TechDetector, TechDetectorError,
};

fn service_with_cache(path: std::path::PathBuf) -> BackgroundService {
    let config = ConfigManager::custom().cache_path(path).build();
    BackgroundService::new(TechDetector::with_catalog(SignatureCatalog::builtin(), config))
}

const UPDATE: &str = r#"{
    "action": "updateDetectionResults",
    "url": "https://news.example.org/today",
    "title": "News",
    "results": [
        {"name": "React", "category": "JavaScript Framework", "icon": "R", "confidence": 100,
         "matches": ["HTML content", "Global variable"]},
        {"name": "YouTube", "category": "Video Player", "icon": "Y", "confidence": 50, "matches": []}
    ]
}"#;

#[tokio::test]
async fn message_flow_update_get_clear() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with_cache(dir.path().join("cache.mp"));

    let reply: serde_json::Value = serde_json::from_str(&service.handle_json(UPDATE).await).unwrap();
    assert_eq!(reply, serde_json::json!({"success": true}));

    let reply: serde_json::Value = serde_json::from_str(
        &service
            .handle_json(r#"{"action": "getStoredResults", "hostname": "news.example.org"}"#)
            .await,
    )
    .unwrap();
    assert_eq!(reply["success"], true);
    assert_eq!(reply["data"]["title"], "News");
    assert_eq!(reply["data"]["detectionVersion"], "2.0");
    assert_eq!(reply["data"]["results"][0]["name"], "React");
    // 存储条目只放在 data 中，results 仅用于结果列表
    assert!(reply.get("results").is_none());

    let reply: serde_json::Value = serde_json::from_str(
        &service
            .handle_json(r#"{"action": "getDetectionResults", "url": "https://news.example.org/other"}"#)
            .await,
    )
    .unwrap();
    assert_eq!(reply["results"].as_array().unwrap().len(), 2);

    let badge = service.badge_for("https://news.example.org/").await;
    assert_eq!(badge.text, "2");
    assert_eq!(badge.tier, BadgeTier::Low);

    let response = service
        .handle(Request::ClearStorageForDomain { hostname: "news.example.org".to_string() })
        .await;
    assert!(response.success);
    assert_eq!(service.badge_for("https://news.example.org/").await, Badge::cleared());

    let response = service
        .handle(Request::GetStoredResults { hostname: "news.example.org".to_string() })
        .await;
    assert!(response.success);
    assert!(response.data.is_none());
}

#[tokio::test]
async fn restricted_update_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with_cache(dir.path().join("cache.mp"));

    let response = service
        .handle(Request::UpdateDetectionResults {
            url: "chrome://newtab".to_string(),
            title: None,
            results: Vec::new(),
        })
        .await;
    assert!(!response.success);
    assert!(response.error.is_some());
}

#[tokio::test]
async fn persist_and_restore_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.mp");

    let service = service_with_cache(path.clone());
    service.handle_json(UPDATE).await;
    service.persist().await.unwrap();

    let fresh = service_with_cache(path);
    assert_eq!(fresh.restore().await.unwrap(), 1);
    assert_eq!(fresh.badge_for("https://news.example.org/").await.text, "2");
    assert_eq!(fresh.sweep().await.unwrap(), 0);
}

#[tokio::test]
async fn analyze_reuses_fresh_cache() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with_cache(dir.path().join("cache.mp"));

    let first_html = r#"<html><head><script src="/js/jquery.min.js"></script></head></html>"#;
    let first = service
        .analyze(&PageContext::new("https://shop.example.com/", first_html), &HtmlSnapshotExtractor)
        .await
        .unwrap();
    assert!(first.iter().any(|r| r.name == "jQuery"));

    // 30秒内同一主机直接返回缓存结果
    let second = service
        .analyze(&PageContext::new("https://shop.example.com/cart", "<html></html>"), &HtmlSnapshotExtractor)
        .await
        .unwrap();
    assert_eq!(first, second);

    let err = service
        .analyze(&PageContext::new("about:blank", "<html></html>"), &HtmlSnapshotExtractor)
        .await
        .unwrap_err();
    assert!(matches!(err, TechDetectorError::RestrictedContext(_)));
}
