//! 全局错误类型定义

use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::{io::Error as IoError, time::SystemTimeError};
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum TechDetectorError {
    // 签名目录相关错误
    #[error("签名目录加载失败：{0}")]
    CatalogLoadError(String),
    #[error("签名目录解析失败：{0}")]
    CatalogParseError(String),

    // 编译/匹配相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),
    #[error("无效的CSS选择器：{0}")]
    InvalidSelector(String),

    // 快照提取相关错误
    #[error("全局变量探测失败：{0}")]
    ProbeError(String),
    #[error("页面快照不可用：{0}")]
    SnapshotUnavailable(String),
    #[error("受限页面，禁止检测：{0}")]
    RestrictedContext(String),

    // 缓存相关错误
    #[error("结果缓存失败：{0}")]
    CacheError(String),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("系统时间计算失败：{0}")]
    SystemTimeError(#[from] SystemTimeError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type TdResult<T> = Result<T, TechDetectorError>;
