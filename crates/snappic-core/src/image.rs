use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::SnappicError;
use crate::timer::{DISPLAY_SECS, FADEOUT_SECS};

/// Server-reported display phase of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    Visible,
    Fading,
}

impl ImageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageState::Visible => "visible",
            ImageState::Fading => "fading",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ImageState::Visible => "Visible",
            ImageState::Fading => "Fading",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(ImageState::Visible),
            "fading" => Some(ImageState::Fading),
            _ => None,
        }
    }

    /// The phase a backend assigns for a given age. `None` once the image
    /// has outlived both phases and should no longer be listed.
    pub fn from_age(age: f64) -> Option<Self> {
        if age <= DISPLAY_SECS {
            Some(ImageState::Visible)
        } else if age <= DISPLAY_SECS + FADEOUT_SECS {
            Some(ImageState::Fading)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One entry of `GET /api/images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub filename: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub timestamp: String,
    /// Seconds since upload, computed by the server.
    pub age: f64,
    pub state: ImageState,
    pub url: String,
}

impl Image {
    pub fn display_comment(&self) -> &str {
        match self.comment.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => "No comment",
        }
    }

    pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp).ok()
    }
}

/// Parse an upload timestamp. Backends emit ISO-8601 local times, with or
/// without fractional seconds and occasionally with an offset.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, SnappicError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| SnappicError::Parse(format!("timestamp {s:?}: {e}")))
}

/// Body of `POST /api/upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
