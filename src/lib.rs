pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AppConfig;
pub use error::{DraftError, UploadError};
pub use service::{BatchUploader, DraftStore};
