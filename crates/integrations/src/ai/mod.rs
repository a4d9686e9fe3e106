//! AI service adapters.
//!
//! [`FakeAiService`] returns deterministic placeholder data;
//! [`OpenAiService`] talks to the OpenAI images and chat APIs and renders
//! slogans with [`TextOverlay`].

pub mod fake;
pub mod openai;
pub mod overlay;

pub use fake::FakeAiService;
pub use openai::OpenAiService;
pub use overlay::TextOverlay;
