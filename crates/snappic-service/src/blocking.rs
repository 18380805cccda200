use snappic_core::upload::UploadForm;
use snappic_core::{Image, UploadResponse};
use tokio::runtime::Runtime;

use crate::{GalleryService, HttpService, ServiceError};

/// Blocking wrapper around the async `HttpService`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingHttpService {
    inner: HttpService,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: HttpService::new(base_url),
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn image_url(&self, image: &Image) -> String {
        self.inner.image_url(image)
    }

    pub fn list_images(&self) -> Result<Vec<Image>, ServiceError> {
        self.rt.block_on(self.inner.list_images())
    }

    pub fn upload_image(&self, form: &UploadForm) -> Result<UploadResponse, ServiceError> {
        self.rt.block_on(self.inner.upload_image(form))
    }
}
