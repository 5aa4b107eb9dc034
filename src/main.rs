use docflow_drafts::api::{self, session::DraftSessions, AppState};
use docflow_drafts::client::{create_http_client, HttpUploadClient};
use docflow_drafts::{AppConfig, BatchUploader};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式, 级别可由 RUST_LOG 覆盖
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 上传客户端 + 编排器
    let http = create_http_client(&config.upload)?;
    let client = Arc::new(HttpUploadClient::new(http, config.upload.base_url.clone()));
    let uploader = Arc::new(BatchUploader::new(client, &config.upload));
    info!("Upload target: {}", config.upload.base_url);

    let state = AppState {
        sessions: Arc::new(DraftSessions::new()),
        uploader,
    };

    let app = api::router(state).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/drafts/:kind            - open po/dc/invoice draft");
    info!("  POST /api/sessions/:id/commands   - apply edit command");
    info!("  POST /api/uploads/start/:kind     - chunked po/srv upload");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
