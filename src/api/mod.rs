pub mod handlers;
pub mod session;

use crate::service::BatchUploader;
use axum::{
    routing::{get, post, put},
    Router,
};
use session::DraftSessions;
use std::sync::Arc;

pub use handlers::*;

/// 共享状态: 草稿会话表 + 上传编排器
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<DraftSessions>,
    pub uploader: Arc<BatchUploader>,
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/drafts/:kind", post(open_draft))
        .route("/api/sessions/:id", get(get_draft).delete(close_draft))
        .route("/api/sessions/:id/commands", post(apply_command))
        .route("/api/sessions/:id/export", get(export_draft))
        .route("/api/uploads/start/:kind", post(start_upload))
        .route("/api/uploads/progress", get(upload_progress))
        .route("/api/uploads/cancel", post(cancel_upload))
        .route("/api/uploads/reset", post(reset_upload))
        .route("/api/uploads/minimized", put(set_minimized))
        .with_state(state)
}
