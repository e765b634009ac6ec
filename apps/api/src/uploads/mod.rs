// Cover-letter uploads: payload normalization, storage and the two endpoints.

pub mod handlers;
pub mod payload;
pub mod store;

pub use store::UploadStore;

/// Cap on any request body, enforced before handlers run.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
