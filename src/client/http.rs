use crate::config::UploadConfig;
use std::time::Duration;

/// 创建上传用 HTTP 客户端
pub fn create_http_client(config: &UploadConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
}
