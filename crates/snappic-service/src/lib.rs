mod blocking;
mod http;
mod traits;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use blocking::BlockingHttpService;
pub use http::HttpService;
pub use traits::{GalleryService, ServiceError};
