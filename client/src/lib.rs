#![warn(clippy::unwrap_used)]

pub mod candidate;
pub mod error;
pub mod gallery;
pub mod local;
pub mod navigation;
pub mod pagination;
pub mod render;
pub mod resource;
pub mod store;
pub mod upload;

pub use candidate::Candidate;
pub use error::ClientError;
pub use gallery::{Gallery, GalleryView, Preview, Row};
pub use local::LocalStorage;
pub use navigation::{Key, Navigator, View};
pub use pagination::{Control, Pager};
pub use store::{LocalStore, RecordKey, RecordStore, ServerStore, Store};
pub use upload::{UploadController, UploadOutcome};
