use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use snappic_core::upload::{MAX_COMMENT_CHARS, MAX_UPLOAD_BYTES};
use snappic_core::{Image, ImageState, UploadResponse};
use tokio::net::TcpListener;

const MAX_IMAGES: usize = 10;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// In-memory stand-in for the SnapPic backend. Time only moves when a test
/// calls [`MockBackend::advance`].
#[derive(Default)]
pub struct MockBackend {
    images: Mutex<Vec<Image>>,
    uploads: AtomicUsize,
    list_requests: AtomicUsize,
    upload_requests: AtomicUsize,
    fail_listing: AtomicBool,
}

impl MockBackend {
    pub fn set_images(&self, images: Vec<Image>) {
        *self.images.lock().unwrap() = images;
    }

    pub fn images(&self) -> Vec<Image> {
        self.images.lock().unwrap().clone()
    }

    /// Age every image by `secs`, updating phases and dropping anything past
    /// the fade window.
    pub fn advance(&self, secs: f64) {
        let mut images = self.images.lock().unwrap();
        images.retain_mut(|img| {
            img.age += secs;
            match ImageState::from_age(img.age) {
                Some(state) => {
                    img.state = state;
                    true
                }
                None => false,
            }
        });
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    pub fn upload_requests(&self) -> usize {
        self.upload_requests.load(Ordering::SeqCst)
    }

    fn store_upload(&self, ext: &str, comment: String) -> Image {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        let now = chrono::Local::now().naive_local();
        let filename = format!("{}-{n}.{ext}", now.format("%Y-%m-%dT%H-%M-%S"));
        let image = Image {
            url: format!("/uploads/{filename}"),
            filename,
            comment: Some(comment),
            timestamp: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            age: 0.0,
            state: ImageState::Visible,
        };
        let mut images = self.images.lock().unwrap();
        images.push(image.clone());
        while images.len() > MAX_IMAGES {
            images.remove(0);
        }
        image
    }
}

/// Build an image as the backend would list it at the given age.
pub fn listed_image(filename: &str, age: f64) -> Image {
    Image {
        filename: filename.to_string(),
        comment: Some(format!("caption for {filename}")),
        timestamp: "2024-05-01T10:00:00.000000".to_string(),
        age,
        state: ImageState::from_age(age).unwrap_or(ImageState::Fading),
        url: format!("/uploads/{filename}"),
    }
}

pub fn test_router(backend: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/api/images", get(list_images))
        .route("/api/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES as usize * 2))
        .with_state(backend)
}

async fn list_images(
    State(backend): State<Arc<MockBackend>>,
) -> Result<Json<Vec<Image>>, (StatusCode, Json<Value>)> {
    backend.list_requests.fetch_add(1, Ordering::SeqCst);
    if backend.fail_listing.load(Ordering::SeqCst) {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "backend unavailable" })),
        ));
    }
    Ok(Json(backend.images()))
}

async fn upload(
    State(backend): State<Arc<MockBackend>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    backend.upload_requests.fetch_add(1, Ordering::SeqCst);

    let mut file_name: Option<String> = None;
    let mut comment = String::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return rejected("invalid multipart"),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                file_name = field.file_name().map(String::from);
                if field.bytes().await.is_err() {
                    return rejected("Failed to read image");
                }
            }
            "comment" => comment = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    let Some(file_name) = file_name.filter(|n| !n.is_empty()) else {
        return rejected("No image file provided");
    };
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return rejected("Invalid file format. Use JPG, PNG, or WEBP");
    }
    let comment = comment.trim().to_string();
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return rejected("Comment too long (max 100 characters)");
    }

    backend.store_upload(&ext, comment);
    (
        StatusCode::OK,
        Json(UploadResponse::ok("Image uploaded successfully")),
    )
}

fn rejected(error: &str) -> (StatusCode, Json<UploadResponse>) {
    (StatusCode::BAD_REQUEST, Json(UploadResponse::failed(error)))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<MockBackend>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let backend = Arc::new(MockBackend::default());
    let app = test_router(backend.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        backend,
        _handle: handle,
    }
}
