//! 工具模块：检测结果更新等辅助功能
pub mod detection_updater;

pub use self::detection_updater::{DetectionUpdater, ScoreCard, MAX_CONFIDENCE};
