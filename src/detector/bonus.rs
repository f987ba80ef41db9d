//! 附加分规则：按技术名称索引的启发式加分表
//! 附加分只调整置信度，不产生命中原因

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::extractor::{PageSnapshot, ResourceEntry};

/// 附加分规则
#[derive(Clone, Copy)]
pub struct BonusRule {
    pub points: u32,
    pub applies: fn(&PageSnapshot) -> bool,
}

/// 技术名称 -> 附加分规则
pub static BONUS_RULES: Lazy<HashMap<&'static str, BonusRule>> = Lazy::new(|| {
    HashMap::from([
        ("YouTube", BonusRule { points: 50, applies: youtube }),
        ("Google Analytics", BonusRule { points: 30, applies: google_analytics }),
        ("Google Tag Manager", BonusRule { points: 30, applies: google_tag_manager }),
        ("PWA", BonusRule { points: 40, applies: pwa }),
        ("HTTP/3", BonusRule { points: 20, applies: http3 }),
        ("HSTS", BonusRule { points: 15, applies: hsts }),
        ("Open Graph", BonusRule { points: 40, applies: open_graph }),
        ("Polymer", BonusRule { points: 30, applies: polymer }),
    ])
});

/// 指定技术在当前页面上的附加分
pub fn bonus_for(name: &str, snapshot: &PageSnapshot) -> u32 {
    match BONUS_RULES.get(name) {
        Some(rule) if (rule.applies)(snapshot) => rule.points,
        _ => 0,
    }
}

fn youtube(snapshot: &PageSnapshot) -> bool {
    snapshot
        .hostname()
        .is_some_and(|host| host.contains("youtube.com"))
        || snapshot.dom_exists("ytd-app, #player, .html5-video-player")
}

fn google_analytics(snapshot: &PageSnapshot) -> bool {
    let markup = snapshot.markup();
    markup.contains("gtag(")
        || markup.contains("ga(")
        || snapshot
            .scripts()
            .iter()
            .map(ResourceEntry::as_str)
            .any(|script| script.contains("google-analytics"))
}

fn google_tag_manager(snapshot: &PageSnapshot) -> bool {
    snapshot.markup().contains("googletagmanager.com") || snapshot.has_global("dataLayer")
}

fn pwa(snapshot: &PageSnapshot) -> bool {
    snapshot.dom_exists(r#"link[rel="manifest"]"#) && snapshot.service_worker()
}

fn http3(snapshot: &PageSnapshot) -> bool {
    let markup = snapshot.markup();
    markup.contains("h3-") || markup.contains("http3")
}

// 仅凭 https 推测，可能误报
fn hsts(snapshot: &PageSnapshot) -> bool {
    snapshot.is_secure()
}

fn open_graph(snapshot: &PageSnapshot) -> bool {
    snapshot.meta().keys().any(|name| name.starts_with("og:"))
        || snapshot.dom_exists(r#"meta[property^="og:"]"#)
}

fn polymer(snapshot: &PageSnapshot) -> bool {
    snapshot.markup().contains("polymer") || snapshot.dom_exists("polymer-element")
}
