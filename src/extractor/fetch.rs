//! 页面抓取：为命令行等非浏览器调用方获取页面HTML
//! 仅使用响应体与最终地址，不读取响应头

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::error::{TdResult, TechDetectorError};

/// 抓取结果
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 跟随重定向后的最终地址
    pub final_url: String,
    pub body: String,
}

/// 页面抓取器
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &GlobalConfig) -> TdResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> TdResult<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TechDetectorError::SnapshotUnavailable(format!(
                "URL {} 返回状态码 {}",
                url,
                response.status()
            )));
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!("页面抓取成功：{}，正文{}字节", final_url, body.len());

        Ok(FetchedPage { final_url, body })
    }
}
