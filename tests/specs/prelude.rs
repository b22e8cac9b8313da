// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture: one job store seen through both the service and the
//! orchestrator, a worker registry and a controllable clock.

pub use ef_core::test_support::{capabilities, heartbeat};
pub use ef_core::{
    Demand, FakeClock, HeartbeatInstruction, HeartbeatResult, Job, JobHeartbeat, JobId,
    JobInstruction, JobStatus, ProcessMode, WorkerId,
};
pub use ef_engine::{
    EngineConfig, EngineError, HookLog, JobEvent, JobEvents, JobOrchestrator, JobService,
    RecordingHandler,
};
pub use ef_storage::{JobRepository, MemoryStore, WorkerRepository};
pub use std::sync::Arc;
pub use std::time::Duration;
pub use tokio_util::sync::CancellationToken;

/// Epoch ms every fleet starts at
pub const START_MS: u64 = 1_700_000_000_000;

pub struct Fleet {
    pub service: JobService<FakeClock>,
    pub orchestrator: JobOrchestrator<FakeClock>,
    pub workers: WorkerRepository,
    pub store: MemoryStore<Job>,
    pub clock: FakeClock,
    pub log: HookLog,
    pub cancel: CancellationToken,
}

impl Fleet {
    pub fn new() -> Self {
        Self::with_handlers(&[])
    }

    /// Fleet whose job service notifies one recording handler per name.
    pub fn with_handlers(names: &[&str]) -> Self {
        init_tracing();
        let store = MemoryStore::<Job>::new();
        let jobs = JobRepository::new(Arc::new(store.clone()));
        let workers = WorkerRepository::in_memory();
        let clock = FakeClock::at(START_MS);
        let log = HookLog::new();

        let mut events = JobEvents::new();
        for name in names {
            events.register(Arc::new(RecordingHandler::new(name, &log)));
        }

        let service = JobService::new(jobs.clone(), events, clock.clone());
        let orchestrator = JobOrchestrator::new(jobs, EngineConfig::default(), clock.clone())
            .with_workers(workers.clone());
        let cancel = CancellationToken::new();
        Self { service, orchestrator, workers, store, clock, log, cancel }
    }

    pub async fn create(&self, job: Job) -> Job {
        self.service.create_job(job, &self.cancel).await.unwrap()
    }

    pub async fn job(&self, id: &str) -> Job {
        self.service.get_job(&JobId::new(id), &self.cancel).await.unwrap().unwrap()
    }

    /// Pull with the given capabilities, up to `max` jobs.
    pub async fn pull(
        &self,
        worker: &str,
        caps: &[(&str, &str)],
        max: usize,
    ) -> Vec<JobInstruction> {
        let caps = capabilities(caps);
        self.orchestrator
            .get_available_jobs(&WorkerId::new(worker), Some(&caps), max, &self.cancel)
            .await
            .unwrap()
    }

    pub async fn beat(&self, worker: &str, jobs: Vec<JobHeartbeat>) -> HeartbeatResult {
        self.orchestrator.send_heartbeat(&heartbeat(worker, jobs), &self.cancel).await.unwrap()
    }

    /// Heartbeat report for a job the worker is running as instructed.
    pub fn running(instruction: &JobInstruction) -> JobHeartbeat {
        let hash = instruction.job.content_hash().unwrap();
        JobHeartbeat::running(instruction.job.id.clone(), hash, instruction.process_mode)
    }

    pub fn mode_of(job: &Job, worker: &str) -> Option<ProcessMode> {
        job.processing_status().get(&WorkerId::new(worker)).and_then(|s| s.process_mode)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
