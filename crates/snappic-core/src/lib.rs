pub mod error;
pub mod gallery;
pub mod image;
pub mod message;
pub mod poller;
pub mod timer;
pub mod upload;

pub use error::SnappicError;
pub use gallery::{Gallery, GalleryItem, ReconcileReport};
pub use image::{Image, ImageState, UploadResponse};
pub use poller::Poller;
pub use timer::{TimerPhase, TimerView};
