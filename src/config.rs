use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
///
/// 加载顺序: 内置默认值 → 可选的 `docflow.toml` → 环境变量
/// (`DOCFLOW_SERVER__PORT=9090`, `DOCFLOW_UPLOAD__CHUNK_SIZE=10` ...)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 远端上传服务地址
    pub base_url: String,
    /// 每个分块的文件数
    pub chunk_size: usize,
    /// 每个分块完成后的让出间隔
    pub post_chunk_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            upload: UploadConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            chunk_size: 5,
            post_chunk_delay_ms: 100,
            request_timeout_secs: 120,
        }
    }
}

impl AppConfig {
    /// 按默认值 / 配置文件 / 环境变量依次叠加加载
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("upload.base_url", defaults.upload.base_url)?
            .set_default("upload.chunk_size", defaults.upload.chunk_size as i64)?
            .set_default(
                "upload.post_chunk_delay_ms",
                defaults.upload.post_chunk_delay_ms as i64,
            )?
            .set_default(
                "upload.request_timeout_secs",
                defaults.upload.request_timeout_secs as i64,
            )?
            .add_source(File::with_name("docflow").required(false))
            .add_source(
                Environment::with_prefix("DOCFLOW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 加载配置, 失败时回退到默认值
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }
}
