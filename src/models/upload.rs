use serde::{Deserialize, Serialize};
use std::fmt;

/// 上传类型 (决定目标接口)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Po,
    Srv,
}

impl UploadKind {
    /// 接口路径
    pub fn endpoint(&self) -> &'static str {
        match self {
            UploadKind::Po => "/api/upload/po",
            UploadKind::Srv => "/api/upload/srv",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Po => write!(f, "po"),
            UploadKind::Srv => write!(f, "srv"),
        }
    }
}

impl std::str::FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "po" => Ok(Self::Po),
            "srv" => Ok(Self::Srv),
            _ => Err(format!("Unknown upload kind: {}", s)),
        }
    }
}

/// 待上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }
}

/// 批次状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Completed,
    Cancelled,
    Failed { message: String },
}

/// 单个分块的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkOutcome {
    pub accepted: usize,
    pub rejected: usize,
}

impl ChunkOutcome {
    pub fn all_accepted(count: usize) -> Self {
        Self {
            accepted: count,
            rejected: 0,
        }
    }
}

/// 上传进度快照
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UploadProgress {
    pub status: UploadStatus,
    pub kind: Option<UploadKind>,
    pub file_names: Vec<String>,
    pub current: usize,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub minimized: bool,
}

impl UploadProgress {
    pub fn is_uploading(&self) -> bool {
        self.status == UploadStatus::Uploading
    }
}
