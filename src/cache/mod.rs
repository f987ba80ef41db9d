//! 缓存模块：按主机名保存检测结果
pub mod result_cache;

pub use self::result_cache::{now_millis, CachedPage, ResultCache, DETECTION_VERSION};
