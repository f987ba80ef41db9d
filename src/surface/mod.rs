//! 展示模块：结果分组渲染与徽标
pub mod display;
pub mod badge;

pub use self::display::{group_by_category, render_text, CategoryGroup, EMPTY_STATE_MESSAGE};
pub use self::badge::{Badge, BadgeTier};
