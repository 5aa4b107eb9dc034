use thiserror::Error;

/// 草稿操作错误 (失败时状态保持不变)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("no document loaded")]
    NoDocument,

    #[error("item index {index} out of range (len {len})")]
    ItemIndexOutOfRange { index: usize, len: usize },

    #[error("delivery index {index} out of range for item {item_index} (len {len})")]
    DeliveryIndexOutOfRange {
        item_index: usize,
        index: usize,
        len: usize,
    },

    #[error("no {level} number left after {last}")]
    NumberingExhausted { level: &'static str, last: u32 },
}

/// 批量上传错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("an upload is already in progress")]
    AlreadyUploading,

    #[error("upload request failed: {message}")]
    Transport { message: String },

    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("upload cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Transport {
            message: e.to_string(),
        }
    }
}
