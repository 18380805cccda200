use async_trait::async_trait;
use snappic_core::upload::UploadForm;
use snappic_core::{Image, UploadResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never got an answer.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered and refused the request.
    #[error("{0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Abstraction over the gallery backend.
///
/// `HttpService` talks to a running backend over HTTP; the TUI goes through
/// `BlockingHttpService`, which wraps it.
#[async_trait]
pub trait GalleryService: Send + Sync {
    /// Current images with their server-computed age and phase.
    async fn list_images(&self) -> Result<Vec<Image>, ServiceError>;

    /// Send an upload. Resolves to `Ok` only if the backend reported success.
    async fn upload_image(&self, form: &UploadForm) -> Result<UploadResponse, ServiceError>;
}
