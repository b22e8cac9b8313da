// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ef-core: Data model and demand matching for the edgefleet job engine

pub mod macros;

pub mod clock;
pub mod demand;
pub mod heartbeat;
pub mod id;
pub mod job;
pub mod job_config;
pub mod processing;
pub mod worker;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use demand::{matches, Capabilities, Demand, DemandError, DemandOperator};
pub use heartbeat::{
    Heartbeat, HeartbeatInstruction, HeartbeatResult, HeartbeatResultEntry, JobHeartbeat,
    SupervisorHeartbeat,
};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobId, JobInstruction, JobLifetime, JobStatus, RedundancyConfig};
pub use job_config::{JobConfigError, JobConfiguration};
pub use processing::{ProcessMode, ProcessingStatus, ProcessingStatusMap};
pub use worker::{WorkerId, WorkerStatus};
