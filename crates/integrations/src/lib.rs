//! Collaborator adapters for campaign generation: in-memory stand-ins for
//! tests and demos, plus OpenAI, S3-compatible and Weaviate clients for real runs.

pub mod ai;
pub mod brand;
pub mod factory;
pub mod index;
pub mod storage;
mod weaviate;

pub use ai::{FakeAiService, OpenAiService};
pub use brand::{InMemoryBrandRepository, WeaviateBrandRepository};
pub use factory::{AdapterFactory, Adapters};
pub use index::{InMemoryAssetIndex, WeaviateAssetIndex};
pub use storage::{InMemoryStorage, LocalFsStorage, S3Storage};
