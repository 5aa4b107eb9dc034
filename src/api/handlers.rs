use crate::api::session::{DraftView, SessionError};
use crate::api::AppState;
use crate::models::{DocumentKind, UploadFile, UploadKind, UploadProgress};
use axum::{
    extract::{Json, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 草稿接口响应体
#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub success: bool,
    pub message: String,
    /// 新增行/批次时的编号
    pub created_no: Option<u32>,
    pub draft: Option<DraftView>,
}

/// 上传接口响应体
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub progress: Option<UploadProgress>,
}

#[derive(Debug, Deserialize)]
pub struct MinimizedRequest {
    pub minimized: bool,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

fn session_status(e: &SessionError) -> StatusCode {
    match e {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        SessionError::Draft(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn draft_ok(message: String, created_no: Option<u32>, draft: DraftView) -> Response {
    let response = DraftResponse {
        success: true,
        message,
        created_no,
        draft: Some(draft),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn draft_error(status: StatusCode, message: String) -> Response {
    let response = DraftResponse {
        success: false,
        message,
        created_no: None,
        draft: None,
    };
    (status, Json(response)).into_response()
}

fn session_error(e: SessionError) -> Response {
    draft_error(session_status(&e), format!("Error: {}", e))
}

fn upload_reply(status: StatusCode, success: bool, message: String, progress: Option<UploadProgress>) -> Response {
    let response = UploadResponse {
        success,
        message,
        progress,
    };
    (status, Json(response)).into_response()
}

/// 以单据快照打开草稿会话
pub async fn open_draft(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(snapshot): Json<Value>,
) -> Response {
    let kind: DocumentKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return draft_error(StatusCode::BAD_REQUEST, e),
    };
    let opened = state
        .sessions
        .open(kind, snapshot)
        .and_then(|id| state.sessions.view(id));
    match opened {
        Ok(view) => draft_ok(format!("Opened {} draft", kind), None, view),
        Err(e) => session_error(e),
    }
}

pub async fn get_draft(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.view(id) {
        Ok(view) => draft_ok("OK".to_string(), None, view),
        Err(e) => session_error(e),
    }
}

pub async fn close_draft(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    if state.sessions.close(id) {
        let response = DraftResponse {
            success: true,
            message: format!("Closed draft session {}", id),
            created_no: None,
            draft: None,
        };
        (StatusCode::OK, Json(response)).into_response()
    } else {
        session_error(SessionError::NotFound(id))
    }
}

/// 执行一条编辑命令
pub async fn apply_command(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(command): Json<Value>,
) -> Response {
    match state.sessions.apply(id, command) {
        Ok((created_no, view)) => draft_ok("Applied".to_string(), created_no, view),
        Err(e) => {
            tracing::debug!("Command on draft {} failed: {}", id, e);
            session_error(e)
        }
    }
}

/// 导出明细 CSV
pub async fn export_draft(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.sessions.export_csv(id) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(e) => session_error(e),
    }
}

/// 接收文件并在后台启动批量上传
pub async fn start_upload(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let kind: UploadKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return upload_reply(StatusCode::BAD_REQUEST, false, e, None),
    };

    let mut files = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                match field.bytes().await {
                    Ok(bytes) => files.push(UploadFile::new(file_name, bytes.to_vec())),
                    Err(e) => {
                        return upload_reply(StatusCode::BAD_REQUEST, false, format!("Error: {}", e), None)
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return upload_reply(StatusCode::BAD_REQUEST, false, format!("Error: {}", e), None)
            }
        }
    }

    let count = files.len();
    let batch = match state.uploader.begin(files, kind) {
        Ok(batch) => batch,
        Err(e) => {
            return upload_reply(
                StatusCode::CONFLICT,
                false,
                format!("Error: {}", e),
                Some(state.uploader.progress()),
            )
        }
    };
    let started = batch.started().clone();

    let uploader = state.uploader.clone();
    tokio::spawn(async move {
        uploader.run_batch(batch).await;
    });

    upload_reply(
        StatusCode::ACCEPTED,
        true,
        format!("Uploading {} {} files", count, kind),
        Some(started),
    )
}

pub async fn upload_progress(State(state): State<AppState>) -> Response {
    upload_reply(StatusCode::OK, true, "OK".to_string(), Some(state.uploader.progress()))
}

pub async fn cancel_upload(State(state): State<AppState>) -> Response {
    let cancelled = state.uploader.cancel_upload();
    let message = if cancelled {
        "Cancellation requested".to_string()
    } else {
        "No upload in progress".to_string()
    };
    upload_reply(StatusCode::OK, cancelled, message, Some(state.uploader.progress()))
}

pub async fn reset_upload(State(state): State<AppState>) -> Response {
    match state.uploader.reset_upload() {
        Ok(()) => upload_reply(StatusCode::OK, true, "Reset".to_string(), Some(state.uploader.progress())),
        Err(e) => upload_reply(
            StatusCode::CONFLICT,
            false,
            format!("Error: {}", e),
            Some(state.uploader.progress()),
        ),
    }
}

pub async fn set_minimized(
    State(state): State<AppState>,
    Json(req): Json<MinimizedRequest>,
) -> Response {
    state.uploader.set_minimized(req.minimized);
    upload_reply(StatusCode::OK, true, "OK".to_string(), Some(state.uploader.progress()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::DraftSessions;
    use crate::client::{CancelSignal, UploadClient};
    use crate::config::UploadConfig;
    use crate::error::UploadError;
    use crate::models::{ChunkOutcome, UploadStatus};
    use crate::service::BatchUploader;
    use crate::test_support::sample_po;
    use futures::future::{BoxFuture, FutureExt};
    use reqwest::multipart::{Form, Part};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct AcceptAll;

    impl UploadClient for AcceptAll {
        fn upload_chunk<'a>(
            &'a self,
            _kind: UploadKind,
            files: &'a [UploadFile],
            _cancel: CancelSignal,
        ) -> BoxFuture<'a, Result<ChunkOutcome, UploadError>> {
            async move { Ok(ChunkOutcome::all_accepted(files.len())) }.boxed()
        }
    }

    /// 每个分块都要等测试放行
    struct Gated {
        release: Arc<Notify>,
    }

    impl UploadClient for Gated {
        fn upload_chunk<'a>(
            &'a self,
            _kind: UploadKind,
            files: &'a [UploadFile],
            _cancel: CancelSignal,
        ) -> BoxFuture<'a, Result<ChunkOutcome, UploadError>> {
            async move {
                self.release.notified().await;
                Ok(ChunkOutcome::all_accepted(files.len()))
            }
            .boxed()
        }
    }

    fn state() -> AppState {
        AppState {
            sessions: Arc::new(DraftSessions::new()),
            uploader: Arc::new(BatchUploader::new(Arc::new(AcceptAll), &UploadConfig::default())),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn open_then_edit_draft_over_http() {
        let state = state();
        let response = open_draft(
            State(state.clone()),
            Path("po".to_string()),
            Json(serde_json::to_value(sample_po()).unwrap()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let id: Uuid = serde_json::from_value(body["draft"]["session_id"].clone()).unwrap();

        let response = apply_command(State(state.clone()), Path(id), Json(json!({"op": "add_item"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["created_no"], json!(4));
        assert_eq!(body["draft"]["dirty"], json!(true));

        let response = apply_command(
            State(state.clone()),
            Path(id),
            Json(json!({"op": "remove_item", "index": 10})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = export_draft(State(state.clone()), Path(id)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = close_draft(State(state.clone()), Path(id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = get_draft(State(state), Path(id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_document_kind_is_bad_request() {
        let response = open_draft(State(state()), Path("srv".to_string()), Json(json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_snapshot_is_bad_request() {
        let response = open_draft(State(state()), Path("dc".to_string()), Json(json!({"header": 1}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_controls_report_progress() {
        let state = state();

        let response = cancel_upload(State(state.clone())).await;
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));

        let response = set_minimized(State(state.clone()), Json(MinimizedRequest { minimized: true })).await;
        let body = body_json(response).await;
        assert_eq!(body["progress"]["minimized"], json!(true));
        assert_eq!(body["progress"]["status"]["state"], json!("idle"));

        let response = reset_upload(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(upload_progress(State(state)).await).await;
        assert_eq!(body["progress"]["minimized"], json!(false));
    }

    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, crate::api::router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn upload_form(names: &[&str]) -> Form {
        names.iter().fold(Form::new(), |form, name| {
            form.part(
                "files",
                Part::bytes(name.as_bytes().to_vec()).file_name(name.to_string()),
            )
        })
    }

    #[tokio::test]
    async fn multipart_start_reports_the_new_batch_and_refuses_overlap() {
        let release = Arc::new(Notify::new());
        let config = UploadConfig {
            post_chunk_delay_ms: 0,
            ..UploadConfig::default()
        };
        let uploader = Arc::new(BatchUploader::new(
            Arc::new(Gated {
                release: release.clone(),
            }),
            &config,
        ));
        let state = AppState {
            sessions: Arc::new(DraftSessions::new()),
            uploader: uploader.clone(),
        };

        // 上一批已经完成
        release.notify_one();
        let previous = uploader
            .start_upload(vec![UploadFile::new("old.pdf", vec![0])], UploadKind::Po)
            .await
            .unwrap();
        assert_eq!(previous.status, UploadStatus::Completed);

        let base = serve(state).await;
        let http = reqwest::Client::new();

        let response = http
            .post(format!("{}/api/uploads/start/srv", base))
            .multipart(upload_form(&["a.pdf", "b.pdf"]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["progress"]["status"]["state"], json!("uploading"));
        assert_eq!(body["progress"]["current"], json!(0));
        assert_eq!(body["progress"]["total"], json!(2));
        assert_eq!(body["progress"]["kind"], json!("srv"));
        assert_eq!(body["progress"]["file_names"], json!(["a.pdf", "b.pdf"]));

        let response = http
            .post(format!("{}/api/uploads/start/po", base))
            .multipart(upload_form(&["c.pdf"]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["progress"]["total"], json!(2));

        let response = http
            .post(format!("{}/api/uploads/start/grn", base))
            .multipart(upload_form(&["d.pdf"]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        release.notify_one();
        let mut rx = uploader.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|p| p.status == UploadStatus::Completed),
        )
        .await
        .unwrap()
        .unwrap();
        let progress = uploader.progress();
        assert_eq!(progress.accepted, 2);
        assert_eq!(progress.file_names, vec!["a.pdf", "b.pdf"]);
    }
}
