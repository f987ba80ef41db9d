//! 检测模块：技术检测核心逻辑
pub mod analyzer;
pub mod bonus;
pub mod detector;

// 导出核心接口
pub use self::analyzer::{analyze_all, Analyzer};
pub use self::bonus::{bonus_for, BonusRule, BONUS_RULES};
pub use self::detector::{detect, TechDetector};
