//! 服务模块：消息协议、受限页面策略、检测节流与后台服务
pub mod message;
pub mod policy;
pub mod throttle;
pub mod background;

pub use self::message::{Request, Response, UNKNOWN_ACTION};
pub use self::policy::{ensure_allowed, is_restricted_url, RESTRICTED_PREFIXES};
pub use self::throttle::DetectionThrottle;
pub use self::background::{hostname_of, BackgroundService};
