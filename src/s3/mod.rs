pub mod client;
pub mod error;
pub mod key;
pub mod presign;
pub mod store;
pub mod upload;

pub use client::S3Client;
pub use error::ShareError;
pub use key::{StorageKey, TagSet, derive_key, derive_tags};
pub use presign::{SignedLink, issue_presigned_get};
pub use store::ObjectStore;
pub use upload::upload;
