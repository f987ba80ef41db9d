//! techdetector - 基于签名目录的网页技术栈检测引擎

// 导出全局错误类型
pub use self::error::{TechDetectorError, TdResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{DetectionResult, SignatureRule, SignatureCatalog, CatalogLoader};

// 导出编译模块核心接口
pub use self::compiler::{CompiledSignature, MatchCategory, SignatureCompiler};

// 导出提取模块核心接口
pub use self::extractor::{
    PageSnapshot, PageSnapshotBuilder, ResourceEntry, DomDocument,
    PageContext, SnapshotExtractor, HtmlSnapshotExtractor,
    GlobalScope, NoGlobals, DeclaredGlobals, PageFetcher, FetchedPage,
};

// 导出工具模块核心接口
pub use self::utils::{DetectionUpdater, ScoreCard};

// 导出检测模块核心接口
pub use self::detector::{detect, TechDetector};

// 导出缓存、展示与服务模块核心接口
pub use self::cache::{CachedPage, ResultCache};
pub use self::surface::{group_by_category, render_text, Badge, BadgeTier};
pub use self::service::{BackgroundService, DetectionThrottle, Request, Response, is_restricted_url};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod extractor;
pub mod utils;
pub mod detector;
pub mod cache;
pub mod surface;
pub mod service;
