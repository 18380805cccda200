use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_COMMENT_CHARS: usize = 100;

/// How long a successful upload stays on the upload view before switching
/// to the gallery.
pub const NAVIGATE_DELAY: Duration = Duration::from_secs(1);

pub const SUCCESS_MESSAGE: &str = "Image uploaded successfully!";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Upload failed";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please select an image")]
    NoFileSelected,

    #[error("File too large. Maximum size is 5MB")]
    FileTooLarge { size: u64 },

    #[error("Comment too long (max 100 characters)")]
    CommentTooLong,

    #[error("Cannot read {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the user has typed into the upload form so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
    pub path: String,
    pub comment: String,
}

impl UploadDraft {
    pub fn new(path: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            comment: comment.into(),
        }
    }

    /// Append a character to the caption unless it is already full.
    pub fn push_comment_char(&mut self, c: char) -> bool {
        if self.comment_chars() >= MAX_COMMENT_CHARS {
            return false;
        }
        self.comment.push(c);
        true
    }

    pub fn comment_chars(&self) -> usize {
        self.comment.chars().count()
    }

    /// Check the draft and load the file. Runs entirely locally; nothing is
    /// sent unless this succeeds.
    pub fn validate(&self) -> Result<UploadForm, UploadError> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(UploadError::NoFileSelected);
        }
        let path = Path::new(path);

        let meta = fs::metadata(path).map_err(|source| UploadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(UploadError::NoFileSelected);
        }
        if meta.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::FileTooLarge { size: meta.len() });
        }

        let comment = self.comment.trim();
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(UploadError::CommentTooLong);
        }

        let bytes = fs::read(path).map_err(|source| UploadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(UploadForm {
            content_type: content_type_for(&file_name),
            file_name,
            bytes,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        })
    }
}

/// A validated upload, ready to be sent as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Sent as the `comment` part only when present.
    pub comment: Option<String>,
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
