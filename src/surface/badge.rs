//! 图标徽标：按检测到的技术数量给出徽标文本与颜色

/// 徽标等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTier {
    None,
    Low,
    Moderate,
    High,
}

impl BadgeTier {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => BadgeTier::None,
            1..=5 => BadgeTier::Low,
            6..=10 => BadgeTier::Moderate,
            _ => BadgeTier::High,
        }
    }

    /// 背景颜色
    pub fn color(self) -> &'static str {
        match self {
            BadgeTier::None => "#4285f4",
            BadgeTier::Low => "#34a853",
            BadgeTier::Moderate => "#fbbc04",
            BadgeTier::High => "#ea4335",
        }
    }
}

/// 徽标状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub tier: BadgeTier,
}

impl Badge {
    pub fn from_count(count: usize) -> Self {
        let text = match count {
            0 => String::new(),
            1..=99 => count.to_string(),
            _ => "99+".to_string(),
        };
        Self {
            text,
            tier: BadgeTier::from_count(count),
        }
    }

    /// 清空的徽标（受限页面或无结果）
    pub fn cleared() -> Self {
        Self::from_count(0)
    }

    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}
