use crate::client::UploadClient;
use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::models::{UploadFile, UploadKind, UploadProgress, UploadStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 批量上传编排器
///
/// 把文件按固定大小分块, 逐块顺序上传, 进度通过 watch 通道对外发布。
/// 同一时刻只允许一个批次; 取消是协作式的, 只在分块边界生效
/// (取消信号同时传给客户端, 由客户端决定是否中止在途请求)。
pub struct BatchUploader {
    client: Arc<dyn UploadClient>,
    chunk_size: usize,
    post_chunk_delay: Duration,
    progress: Arc<watch::Sender<UploadProgress>>,
    cancel: Arc<watch::Sender<bool>>,
}

/// 已占用上传槽位、尚未执行的批次
///
/// 由 [`BatchUploader::begin`] 创建; 未执行就被丢弃时批次记为 Cancelled。
pub struct PendingBatch {
    files: Vec<UploadFile>,
    kind: UploadKind,
    started: UploadProgress,
    guard: FinishGuard,
}

impl PendingBatch {
    /// 批次开始时的进度快照 (状态为 Uploading)
    pub fn started(&self) -> &UploadProgress {
        &self.started
    }
}

impl BatchUploader {
    pub fn new(client: Arc<dyn UploadClient>, config: &UploadConfig) -> Self {
        let (progress, _) = watch::channel(UploadProgress::default());
        let (cancel, _) = watch::channel(false);
        Self {
            client,
            chunk_size: config.chunk_size.max(1),
            post_chunk_delay: Duration::from_millis(config.post_chunk_delay_ms),
            progress: Arc::new(progress),
            cancel: Arc::new(cancel),
        }
    }

    /// 当前进度快照
    pub fn progress(&self) -> UploadProgress {
        self.progress.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    pub fn is_uploading(&self) -> bool {
        self.progress.borrow().is_uploading()
    }

    /// 上传整批文件, 返回结束时的进度快照
    pub async fn start_upload(
        &self,
        files: Vec<UploadFile>,
        kind: UploadKind,
    ) -> Result<UploadProgress, UploadError> {
        let batch = self.begin(files, kind)?;
        Ok(self.run_batch(batch).await)
    }

    /// 原子地切换到 Uploading 并占用上传槽位, 已有批次在运行时拒绝
    pub fn begin(
        &self,
        files: Vec<UploadFile>,
        kind: UploadKind,
    ) -> Result<PendingBatch, UploadError> {
        let total = files.len();
        let file_names: Vec<String> = files.iter().map(|f| f.file_name.clone()).collect();

        let started = self.progress.send_if_modified(|p| {
            if p.is_uploading() {
                return false;
            }
            *p = UploadProgress {
                status: UploadStatus::Uploading,
                kind: Some(kind),
                file_names,
                current: 0,
                total,
                accepted: 0,
                rejected: 0,
                minimized: p.minimized,
            };
            true
        });
        if !started {
            warn!("Upload of {} {} files refused: batch already running", total, kind);
            return Err(UploadError::AlreadyUploading);
        }

        self.cancel.send_replace(false);
        Ok(PendingBatch {
            files,
            kind,
            started: self.progress(),
            guard: FinishGuard {
                progress: Arc::clone(&self.progress),
                cancel: Arc::clone(&self.cancel),
            },
        })
    }

    /// 执行已占用槽位的批次, 返回结束时的进度快照
    pub async fn run_batch(&self, batch: PendingBatch) -> UploadProgress {
        let PendingBatch {
            files,
            kind,
            guard: _guard,
            ..
        } = batch;

        info!(
            "Starting {} upload: {} files in chunks of {}",
            kind,
            files.len(),
            self.chunk_size
        );
        let status = self.run_chunks(&files, kind).await;

        self.progress.send_modify(|p| p.status = status);
        let progress = self.progress();
        info!(
            "Upload finished: {:?}, {}/{}, accepted: {}, rejected: {}",
            progress.status, progress.current, progress.total, progress.accepted, progress.rejected
        );
        progress
    }

    async fn run_chunks(&self, files: &[UploadFile], kind: UploadKind) -> UploadStatus {
        let total_chunks = files.len().div_ceil(self.chunk_size);

        for (idx, chunk) in files.chunks(self.chunk_size).enumerate() {
            let cancel_requested = *self.cancel.borrow();
            if cancel_requested {
                info!("Upload cancelled before chunk {}/{}", idx + 1, total_chunks);
                return UploadStatus::Cancelled;
            }

            match self
                .client
                .upload_chunk(kind, chunk, self.cancel.subscribe())
                .await
            {
                Ok(outcome) => {
                    self.progress.send_modify(|p| {
                        p.accepted += outcome.accepted;
                        p.rejected += outcome.rejected;
                        p.current = (p.current + chunk.len()).min(p.total);
                    });
                    info!(
                        "Chunk {}/{} uploaded: accepted {}, rejected {}",
                        idx + 1,
                        total_chunks,
                        outcome.accepted,
                        outcome.rejected
                    );
                }
                Err(UploadError::Cancelled) => {
                    info!("Upload cancelled during chunk {}/{}", idx + 1, total_chunks);
                    return UploadStatus::Cancelled;
                }
                Err(e) => {
                    error!("Chunk {}/{} failed, aborting batch: {}", idx + 1, total_chunks, e);
                    return UploadStatus::Failed {
                        message: e.to_string(),
                    };
                }
            }

            // 让出执行权, 保证进度订阅方能及时刷新
            tokio::time::sleep(self.post_chunk_delay).await;
        }

        UploadStatus::Completed
    }

    /// 请求取消当前批次; 没有批次在运行时返回 false
    pub fn cancel_upload(&self) -> bool {
        if !self.is_uploading() {
            return false;
        }
        info!("Upload cancellation requested");
        self.cancel.send_replace(true);
        true
    }

    /// 清空计数和文件列表, 回到 Idle
    pub fn reset_upload(&self) -> Result<(), UploadError> {
        let reset = self.progress.send_if_modified(|p| {
            if p.is_uploading() {
                return false;
            }
            *p = UploadProgress::default();
            true
        });
        if reset {
            Ok(())
        } else {
            Err(UploadError::AlreadyUploading)
        }
    }

    /// 仅影响展示, 与上传进度无关
    pub fn set_minimized(&self, minimized: bool) {
        self.progress.send_if_modified(|p| {
            let changed = p.minimized != minimized;
            p.minimized = minimized;
            changed
        });
    }
}

/// 批次结束 (含 future 被丢弃) 时清除取消标记, 且不停留在 Uploading
struct FinishGuard {
    progress: Arc<watch::Sender<UploadProgress>>,
    cancel: Arc<watch::Sender<bool>>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.cancel.send_replace(false);
        self.progress.send_if_modified(|p| {
            if p.is_uploading() {
                p.status = UploadStatus::Cancelled;
                return true;
            }
            false
        });
    }
}
