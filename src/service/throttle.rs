//! 检测节流：页面变化触发的重复检测之间保持最小间隔

use std::time::Duration;

use crate::config::{GlobalConfig, DEFAULT_THROTTLE_INTERVAL};

#[derive(Debug, Clone)]
pub struct DetectionThrottle {
    interval_ms: u64,
    last_run: Option<u64>,
}

impl Default for DetectionThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}

impl DetectionThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_run: None,
        }
    }

    pub fn from_config(config: &GlobalConfig) -> Self {
        Self::new(config.throttle_interval)
    }

    /// 记录一次检测（如页面加载时的首次检测）
    pub fn mark(&mut self, now: u64) {
        self.last_run = Some(now);
    }

    /// 距上次检测超过间隔时允许运行，并记录本次时间
    pub fn try_acquire(&mut self, now: u64) -> bool {
        let allowed = match self.last_run {
            Some(last) => now.saturating_sub(last) > self.interval_ms,
            None => true,
        };
        if allowed {
            self.last_run = Some(now);
        }
        allowed
    }

    pub fn last_run(&self) -> Option<u64> {
        self.last_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_enforced() {
        let mut throttle = DetectionThrottle::default();
        throttle.mark(10_000);

        assert!(!throttle.try_acquire(11_000));
        assert!(!throttle.try_acquire(13_000));
        assert!(throttle.try_acquire(13_001));
        assert_eq!(throttle.last_run(), Some(13_001));
        // 被拒绝的尝试不刷新时间
        assert!(!throttle.try_acquire(16_000));
        assert!(throttle.try_acquire(16_002));
    }

    #[test]
    fn test_interval_from_config() {
        let config = crate::config::ConfigManager::custom()
            .throttle_interval(Duration::from_millis(100))
            .build();
        let mut throttle = DetectionThrottle::from_config(&config);
        assert!(throttle.try_acquire(1_000));
        assert!(!throttle.try_acquire(1_100));
        assert!(throttle.try_acquire(1_101));
    }

    #[test]
    fn test_first_run_allowed() {
        let mut throttle = DetectionThrottle::new(Duration::from_secs(1));
        assert!(throttle.try_acquire(0));
        assert!(!throttle.try_acquire(500));
    }
}
