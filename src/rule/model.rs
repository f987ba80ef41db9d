//! 签名与检测结果数据模型定义
//! 仅存储数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 技术检测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub name: String,
    pub category: String,
    pub icon: String,
    pub confidence: u8,
    /// 命中原因（去重，保持首次出现顺序）
    #[serde(default)]
    pub matches: Vec<String>,
}

// ======== 为 DetectionResult 实现 Display trait（用于 CLI 输出） ========
impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.name, self.confidence)
    }
}

/// 原始签名规则（从 JSON 签名目录解析）
///
/// `patterns` 的键为信号类别（html/scripts/css/globals/dom/meta/headers），
/// 值为单个字符串或字符串数组。未知类别、空数组等畸形数据在编译阶段被跳过。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignatureRule {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub patterns: BTreeMap<String, serde_json::Value>,
}
