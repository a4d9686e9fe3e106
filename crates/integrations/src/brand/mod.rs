//! Brand repository adapters.

pub mod memory;
pub mod weaviate;

pub use memory::InMemoryBrandRepository;
pub use weaviate::WeaviateBrandRepository;

use campaign_core::types::BrandSummary;

/// Free text describing a brand, used as the similarity query.
pub(crate) fn similarity_text(brand: &BrandSummary) -> String {
    format!(
        "{} {} {}",
        brand.description,
        brand.voice_tone,
        brand.target_audiences.join(" ")
    )
}
