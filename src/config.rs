//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;
use std::time::Duration;

/// 检测结果缓存新鲜度阈值（30秒内的缓存可直接复用）
pub const DEFAULT_FRESH_TTL: Duration = Duration::from_secs(30);
/// 缓存保留窗口（超过24小时的条目会被清理）
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);
/// 同一页面两次检测的最小间隔
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_secs(3);
/// 周期清理间隔
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 自定义签名目录路径（None 时使用内置目录）
    pub catalog_path: Option<PathBuf>,
    // 检测结果缓存文件路径
    pub cache_path: PathBuf,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 抓取页面时使用的 User-Agent
    pub user_agent: String,
    // 是否启用详细日志
    pub verbose: bool,
    pub fresh_ttl: Duration,
    pub retention: Duration,
    pub throttle_interval: Duration,
    pub sweep_interval: Duration,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            cache_path: PathBuf::from("techdetector_cache.mp"),
            http_timeout: 30,
            user_agent: format!("techdetector/{}", env!("CARGO_PKG_VERSION")),
            verbose: false,
            fresh_ttl: DEFAULT_FRESH_TTL,
            retention: DEFAULT_RETENTION,
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog_path(mut self, path: PathBuf) -> Self {
        self.config.catalog_path = Some(path);
        self
    }

    pub fn cache_path(mut self, path: PathBuf) -> Self {
        self.config.cache_path = path;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn fresh_ttl(mut self, ttl: Duration) -> Self {
        self.config.fresh_ttl = ttl;
        self
    }

    pub fn retention(mut self, retention: Duration) -> Self {
        self.config.retention = retention;
        self
    }

    pub fn throttle_interval(mut self, interval: Duration) -> Self {
        self.config.throttle_interval = interval;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
