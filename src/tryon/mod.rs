// src/tryon/mod.rs

pub mod cancellation;
pub mod clients;
pub mod config;
pub mod data_uri;
pub mod download;
pub mod downscale;
pub mod event;
pub mod generation;
pub mod image_asset;
pub mod orchestrator;
pub mod outcome;
pub mod prompt;
pub mod state;

// Export RequestOrchestrator directly so it does not have to be reached through orchestrator::
pub use orchestrator::{OrchestratorError, RequestOrchestrator};
