pub mod http;
pub mod upload_client;

pub use http::create_http_client;
pub use upload_client::{CancelSignal, HttpUploadClient, UploadClient};
