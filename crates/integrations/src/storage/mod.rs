//! Blob storage adapters.

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalFsStorage;
pub use memory::InMemoryStorage;
pub use s3::S3Storage;
