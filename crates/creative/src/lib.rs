//! Localized campaign creative pipeline: per-combination generation with
//! index reuse, compliance validation, orchestration, reporting and alerting.

pub mod generator;
pub mod monitor;
pub mod orchestrator;
pub mod presenter;
pub mod validator;

pub use generator::CampaignGenerator;
pub use monitor::CampaignMonitor;
pub use orchestrator::{CampaignOrchestrator, CampaignOutcome, CampaignSummary};
pub use presenter::CampaignPresenter;
pub use validator::CampaignValidator;
