// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::demand::Capabilities;
use crate::heartbeat::{Heartbeat, JobHeartbeat, SupervisorHeartbeat};
use crate::worker::WorkerStatus;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for model types.
pub mod strategies {
    use crate::demand::{Capabilities, Demand, DemandOperator};
    use crate::job::JobStatus;
    use crate::processing::ProcessMode;
    use proptest::prelude::*;

    /// Keys are drawn from a small alphabet so demands and capabilities
    /// collide often enough to exercise both outcomes.
    pub fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![Just("site"), Just("Site"), Just("line"), Just("gpu"), Just("os")]
            .prop_map(str::to_string)
    }

    pub fn arb_value() -> impl Strategy<Value = String> {
        prop_oneof![Just("a"), Just("b"), Just("linux"), Just("plant-7")].prop_map(str::to_string)
    }

    /// Demands with supported operators and patterns that always compile.
    pub fn arb_demand() -> impl Strategy<Value = Demand> {
        prop_oneof![
            arb_key().prop_map(Demand::exists),
            (arb_key(), arb_value()).prop_map(|(k, v)| Demand::equals(k, v)),
            (arb_key(), prop_oneof![Just("^a$"), Just("lin"), Just("plant-\\d+"), Just(".*")])
                .prop_map(|(k, p)| Demand::matching(k, p)),
            arb_key().prop_map(|k| Demand {
                key: k,
                operator: DemandOperator::Equals,
                value: None
            }),
        ]
    }

    pub fn arb_capabilities() -> impl Strategy<Value = Capabilities> {
        prop::collection::hash_map(arb_key(), arb_value(), 0..4)
    }

    pub fn arb_process_mode() -> impl Strategy<Value = ProcessMode> {
        prop_oneof![Just(ProcessMode::Active), Just(ProcessMode::Passive)]
    }

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Active),
            Just(JobStatus::Canceled),
            Just(JobStatus::Deleted),
            Just(JobStatus::Completed),
            Just(JobStatus::Error),
        ]
    }
}

// ── Factory functions ───────────────────────────────────────────────────

/// Capabilities from `(key, value)` pairs.
pub fn capabilities(pairs: &[(&str, &str)]) -> Capabilities {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Heartbeat from `worker_id` covering `jobs`.
pub fn heartbeat(worker_id: &str, jobs: Vec<JobHeartbeat>) -> Heartbeat {
    let status =
        if jobs.is_empty() { WorkerStatus::WaitingForJob } else { WorkerStatus::ProcessingJob };
    Heartbeat {
        supervisor: SupervisorHeartbeat { status, ..SupervisorHeartbeat::new(worker_id) },
        jobs,
    }
}
