//! Shared value objects, configuration, error types and collaborator traits
//! for the campaign creative generator.

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
