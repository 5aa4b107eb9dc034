use crate::error::UploadError;
use crate::models::{ChunkOutcome, UploadFile, UploadKind};
use futures::future::{BoxFuture, FutureExt};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::sync::watch;

/// 取消信号: 值变为 true 表示调用方请求取消
pub type CancelSignal = watch::Receiver<bool>;

/// 批量上传接口: 每次调用上传一个分块
pub trait UploadClient: Send + Sync {
    fn upload_chunk<'a>(
        &'a self,
        kind: UploadKind,
        files: &'a [UploadFile],
        cancel: CancelSignal,
    ) -> BoxFuture<'a, Result<ChunkOutcome, UploadError>>;
}

/// 上传接口响应体; 字段缺失视为整块接收
#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    accepted: Option<usize>,
    rejected: Option<usize>,
}

/// 基于 reqwest 的 multipart 上传
pub struct HttpUploadClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUploadClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, kind: UploadKind) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), kind.endpoint())
    }
}

impl UploadClient for HttpUploadClient {
    fn upload_chunk<'a>(
        &'a self,
        kind: UploadKind,
        files: &'a [UploadFile],
        mut cancel: CancelSignal,
    ) -> BoxFuture<'a, Result<ChunkOutcome, UploadError>> {
        async move {
            let url = self.url_for(kind);
            let mut form = Form::new();
            for file in files {
                form = form.part(
                    "files",
                    Part::bytes(file.content.clone()).file_name(file.file_name.clone()),
                );
            }

            let request = self.client.post(&url).multipart(form).send();
            let response = tokio::select! {
                res = request => res?,
                _ = cancelled(&mut cancel) => {
                    tracing::warn!("Upload to {} aborted in flight", url);
                    return Err(UploadError::Cancelled);
                }
            };

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(UploadError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(parse_outcome(&body, files.len()))
        }
        .boxed()
    }
}

/// 等待取消信号; 发送端已释放则永不返回
async fn cancelled(cancel: &mut CancelSignal) {
    let sender_dropped = cancel.wait_for(|requested| *requested).await.is_err();
    if sender_dropped {
        futures::future::pending::<()>().await;
    }
}

/// 解析分块结果: 没有逐项统计时整块计为接收; 计数不超过分块大小
fn parse_outcome(body: &str, chunk_len: usize) -> ChunkOutcome {
    let response: UploadResponse = serde_json::from_str(body).unwrap_or_default();
    let accepted = response.accepted.map(|n| n.min(chunk_len));
    let rejected = response.rejected.map(|n| n.min(chunk_len));
    match (accepted, rejected) {
        (Some(accepted), Some(rejected)) => ChunkOutcome {
            accepted,
            rejected: rejected.min(chunk_len - accepted),
        },
        (Some(accepted), None) => ChunkOutcome {
            accepted,
            rejected: chunk_len - accepted,
        },
        (None, Some(rejected)) => ChunkOutcome {
            accepted: chunk_len - rejected,
            rejected,
        },
        (None, None) => ChunkOutcome::all_accepted(chunk_len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn files(names: &[&str]) -> Vec<UploadFile> {
        names
            .iter()
            .map(|name| UploadFile::new(*name, name.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn per_item_counts_are_taken_from_response() {
        assert_eq!(
            parse_outcome(r#"{"accepted":3,"rejected":2}"#, 5),
            ChunkOutcome { accepted: 3, rejected: 2 }
        );
        assert_eq!(
            parse_outcome(r#"{"rejected":1}"#, 5),
            ChunkOutcome { accepted: 4, rejected: 1 }
        );
        assert_eq!(
            parse_outcome(r#"{"accepted":2}"#, 5),
            ChunkOutcome { accepted: 2, rejected: 3 }
        );
    }

    #[test]
    fn oversized_counts_are_clamped_to_chunk() {
        assert_eq!(
            parse_outcome(r#"{"accepted":9,"rejected":4}"#, 5),
            ChunkOutcome { accepted: 5, rejected: 0 }
        );
        assert_eq!(
            parse_outcome(r#"{"accepted":3,"rejected":4}"#, 5),
            ChunkOutcome { accepted: 3, rejected: 2 }
        );
        assert_eq!(
            parse_outcome(r#"{"rejected":8}"#, 5),
            ChunkOutcome { accepted: 0, rejected: 5 }
        );
        assert_eq!(
            parse_outcome(r#"{"accepted":8}"#, 5),
            ChunkOutcome::all_accepted(5)
        );
    }

    #[test]
    fn opaque_success_body_accepts_whole_chunk() {
        assert_eq!(parse_outcome("OK", 4), ChunkOutcome::all_accepted(4));
        assert_eq!(parse_outcome(r#"{"status":"ok"}"#, 2), ChunkOutcome::all_accepted(2));
        assert_eq!(parse_outcome("", 0), ChunkOutcome::all_accepted(0));
    }

    #[test]
    fn url_joins_base_and_endpoint() {
        let client = HttpUploadClient::new(reqwest::Client::new(), "http://erp.local/");
        assert_eq!(client.url_for(UploadKind::Po), "http://erp.local/api/upload/po");
        assert_eq!(client.url_for(UploadKind::Srv), "http://erp.local/api/upload/srv");
    }

    #[tokio::test]
    async fn cancelled_resolves_once_flag_is_set() {
        let (tx, mut rx) = watch::channel(false);
        tx.send_replace(true);
        tokio::time::timeout(std::time::Duration::from_secs(1), cancelled(&mut rx))
            .await
            .expect("cancel signal should resolve");
    }

    #[tokio::test]
    async fn chunk_is_posted_as_multipart_files() {
        let seen: Arc<Mutex<Vec<(String, String, Vec<u8>)>>> = Arc::default();
        let router = Router::new().route(
            "/api/upload/po",
            post({
                let seen = seen.clone();
                move |mut multipart: Multipart| {
                    let seen = seen.clone();
                    async move {
                        while let Some(field) = multipart.next_field().await.unwrap() {
                            let name = field.name().unwrap_or_default().to_string();
                            let file_name = field.file_name().unwrap_or_default().to_string();
                            let bytes = field.bytes().await.unwrap().to_vec();
                            seen.lock().unwrap().push((name, file_name, bytes));
                        }
                        Json(json!({"accepted": 1, "rejected": 1}))
                    }
                }
            }),
        );
        let base = serve(router).await;
        let client = HttpUploadClient::new(reqwest::Client::new(), base);
        let (_tx, cancel) = watch::channel(false);

        let outcome = client
            .upload_chunk(UploadKind::Po, &files(&["a.pdf", "b.pdf"]), cancel)
            .await
            .unwrap();

        assert_eq!(outcome, ChunkOutcome { accepted: 1, rejected: 1 });
        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("files".to_string(), "a.pdf".to_string(), b"a.pdf".to_vec()),
                ("files".to_string(), "b.pdf".to_string(), b"b.pdf".to_vec()),
            ]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let router = Router::new().route(
            "/api/upload/srv",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve(router).await;
        let client = HttpUploadClient::new(reqwest::Client::new(), base);
        let (_tx, cancel) = watch::channel(false);

        let result = client
            .upload_chunk(UploadKind::Srv, &files(&["srv_1.xml"]), cancel)
            .await;

        assert_eq!(
            result,
            Err(UploadError::Rejected {
                status: 503,
                body: "maintenance".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn cancel_aborts_request_in_flight() {
        let entered = Arc::new(Notify::new());
        let router = Router::new().route(
            "/api/upload/po",
            post({
                let entered = entered.clone();
                move || {
                    let entered = entered.clone();
                    async move {
                        entered.notify_one();
                        futures::future::pending::<()>().await;
                        "unreachable"
                    }
                }
            }),
        );
        let base = serve(router).await;
        let client = HttpUploadClient::new(reqwest::Client::new(), base);
        let (tx, cancel) = watch::channel(false);
        let chunk = files(&["a.pdf"]);

        let upload = client.upload_chunk(UploadKind::Po, &chunk, cancel);
        let trigger = async {
            entered.notified().await;
            tx.send_replace(true);
        };
        let (result, ()) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(upload, trigger)
        })
        .await
        .expect("cancel should end the request");

        assert_eq!(result, Err(UploadError::Cancelled));
    }
}
