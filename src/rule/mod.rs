//! 规则模块：签名数据模型、签名目录与加载
pub mod model;
pub mod catalog;
pub mod loader;

// 导出核心接口
pub use self::model::{DetectionResult, SignatureRule};
pub use self::catalog::SignatureCatalog;
pub use self::loader::CatalogLoader;
