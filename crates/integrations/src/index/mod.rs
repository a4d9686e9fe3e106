//! Asset index adapters used for reuse lookups.

pub mod memory;
pub mod weaviate;

pub use memory::InMemoryAssetIndex;
pub use weaviate::WeaviateAssetIndex;
