// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ef-engine: Job assignment, redundancy failover and job lifecycle for edgefleet

mod config;
pub mod env;
mod error;
mod hooks;
mod orchestrator;
mod service;

pub use config::EngineConfig;
pub use error::EngineError;
#[cfg(any(test, feature = "test-support"))]
pub use hooks::{HookCall, HookLog, RecordingHandler};
pub use hooks::{HookError, JobEvent, JobEventHandler, JobEvents};
pub use orchestrator::{apply_heartbeat, calculate_instruction, JobOrchestrator};
pub use service::JobService;
