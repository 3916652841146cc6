#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Trait contracts shared by the engine, the agents crate and the API
//! crate: [`provider::ProviderAdapter`] (what one backend looks like),
//! and [`orchestrator::Orchestrator`]/[`orchestrator::TaskQueue`]/
//! [`orchestrator::Selector`] (what the engine exposes to its callers).
//!
//! This crate only defines interfaces; `meta-ai-orchestrator` and
//! `meta-ai-agents` provide the implementations, which keeps those two
//! crates decoupled from each other.

pub mod orchestrator;
pub mod provider;

pub use orchestrator::{Orchestrator, QueueStats, Selector, TaskQueue};
pub use provider::ProviderAdapter;
