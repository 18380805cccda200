use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use snappic_core::upload::{UploadForm, GENERIC_FAILURE_MESSAGE};
use snappic_core::{Image, UploadResponse};
use tracing::{debug, warn};

use crate::{GalleryService, ServiceError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Async HTTP client implementation of GalleryService.
/// Connects to a running SnapPic backend.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("failed to build HTTP client, using defaults without timeout: {e}");
                Client::new()
            });
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an image. Backends usually hand out paths like
    /// `/uploads/<file>`; absolute URLs are passed through.
    pub fn image_url(&self, image: &Image) -> String {
        if image.url.starts_with("http://") || image.url.starts_with("https://") {
            image.url.clone()
        } else if image.url.starts_with('/') {
            format!("{}{}", self.base_url, image.url)
        } else {
            format!("{}/{}", self.base_url, image.url)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        debug!("GET {path}");
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_multipart<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ServiceError> {
        debug!("POST {path} (multipart)");
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }
}

fn multipart_form(upload: &UploadForm) -> Result<Form, ServiceError> {
    let part = Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(upload.content_type)
        .map_err(|e| ServiceError::InvalidInput(format!("content type: {e}")))?;
    let form = Form::new().part("image", part);
    Ok(match &upload.comment {
        Some(comment) => form.text("comment", comment.clone()),
        None => form,
    })
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let app_error = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from));

    if let Some(msg) = app_error {
        return ServiceError::Rejected(msg);
    }
    let msg = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Internal(msg)
    }
}

#[async_trait]
impl GalleryService for HttpService {
    async fn list_images(&self) -> Result<Vec<Image>, ServiceError> {
        self.get_json("/api/images").await
    }

    async fn upload_image(&self, form: &UploadForm) -> Result<UploadResponse, ServiceError> {
        let body = multipart_form(form)?;
        let resp: UploadResponse = self.post_multipart("/api/upload", body).await?;
        if resp.success {
            Ok(resp)
        } else {
            Err(ServiceError::Rejected(
                resp.error
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ))
        }
    }
}
