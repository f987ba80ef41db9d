//! 消息协议：后台服务的请求与响应

use serde::{Deserialize, Serialize};

use crate::cache::CachedPage;
use crate::rule::DetectionResult;

/// 未知或无法解析的请求
pub const UNKNOWN_ACTION: &str = "Unknown action";

/// 请求（以 `action` 字段区分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// 页面侧上报检测结果
    UpdateDetectionResults {
        url: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        results: Vec<DetectionResult>,
    },
    /// 查询主机名下保存的条目
    GetStoredResults { hostname: String },
    ClearStorageForDomain { hostname: String },
    /// 查询页面当前的检测结果
    GetDetectionResults { url: String },
}

/// 响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CachedPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<DetectionResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn with_data(data: Option<CachedPage>) -> Self {
        Self {
            success: true,
            data,
            ..Self::default()
        }
    }

    pub fn with_results(results: Vec<DetectionResult>) -> Self {
        Self {
            success: true,
            results: Some(results),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn unknown_action() -> Self {
        Self::failure(UNKNOWN_ACTION)
    }
}
