// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity and status.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier of a worker or supervisor.
    ///
    /// Workers choose their own ids (typically `{agent}_{instance}`), so
    /// these are usually built with [`WorkerId::new`].
    pub struct WorkerId("wkr-");
}

/// Status a worker or supervisor reports about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    #[default]
    Stopped,
    Stopping,
    WaitingForJob,
    ProcessingJob,
}

crate::str_enum! {
    WorkerStatus {
        Stopped => "stopped",
        Stopping => "stopping",
        WaitingForJob => "waiting_for_job",
        ProcessingJob => "processing_job",
    }
}
