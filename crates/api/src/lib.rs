#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! The Control API: an axum HTTP surface over [`MetaAIOrchestrator`],
//! matching the endpoint set and JSON shapes documented in spec §6.

pub mod dto;
pub mod handlers;
pub mod router;

use meta_ai_orchestrator_engine::MetaAIOrchestrator;
use std::sync::Arc;

/// Shared application state, cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MetaAIOrchestrator>,
}
