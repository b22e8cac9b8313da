// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failover specs
//!
//! Verify standby workers take over silent active workers, and workers stop
//! processing jobs that were canceled, deleted or never existed.

use crate::prelude::*;

const STALE: Duration = Duration::from_secs(600);

async fn active_and_passive(fleet: &Fleet) -> (JobInstruction, JobInstruction) {
    fleet.create(Job::builder().id("J").redundancy(1, 1).build()).await;
    let active = fleet.pull("a", &[], 1).await.remove(0);
    let passive = fleet.pull("b", &[], 1).await.remove(0);
    assert_eq!(active.process_mode, ProcessMode::Active);
    assert_eq!(passive.process_mode, ProcessMode::Passive);
    (active, passive)
}

#[tokio::test]
async fn passive_takes_over_after_active_goes_stale() {
    let fleet = Fleet::new();
    let (active, passive) = active_and_passive(&fleet).await;

    // b keeps heartbeating while a goes silent
    fleet.clock.advance(Duration::from_secs(300));
    let early = fleet.beat("b", vec![Fleet::running(&passive)]).await;
    assert_eq!(early.entries[0].instruction, HeartbeatInstruction::Keep);

    fleet.clock.advance(Duration::from_secs(301));
    let late = fleet.beat("b", vec![Fleet::running(&passive)]).await;
    assert_eq!(late.entries[0].instruction, HeartbeatInstruction::SwitchToActive);
    assert_eq!(late.entries[0].last_active_heartbeat_ms, Some(START_MS));

    let job = fleet.job("J").await;
    assert_eq!(Fleet::mode_of(&job, "b"), Some(ProcessMode::Active));

    // A returning active is not demoted
    let back = fleet.beat("a", vec![Fleet::running(&active)]).await;
    assert_eq!(back.entries[0].instruction, HeartbeatInstruction::Keep);
}

#[tokio::test]
async fn stale_slot_is_reassigned_on_pull() {
    let fleet = Fleet::new();
    fleet.create(Job::builder().id("J").redundancy(1, 0).build()).await;
    fleet.pull("a", &[], 1).await;
    assert!(fleet.pull("b", &[], 1).await.is_empty());

    fleet.clock.advance(STALE + Duration::from_millis(1));

    let pulled = fleet.pull("b", &[], 1).await;
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].process_mode, ProcessMode::Active);
}

#[tokio::test]
async fn canceled_job_stops_every_worker() {
    let fleet = Fleet::new();
    let (active, passive) = active_and_passive(&fleet).await;

    fleet.service.cancel_job(&JobId::new("J"), &fleet.cancel).await.unwrap();

    for (worker, instruction) in [("a", &active), ("b", &passive)] {
        let result = fleet.beat(worker, vec![Fleet::running(instruction)]).await;
        assert_eq!(result.entries[0].instruction, HeartbeatInstruction::CancelProcessing);
        assert!(result.entries[0].updated_job.is_none());
    }
    assert_eq!(fleet.job("J").await.status(), JobStatus::Canceled);
}

#[tokio::test]
async fn deleted_job_is_canceled_without_writes() {
    let fleet = Fleet::new();
    let (active, _) = active_and_passive(&fleet).await;
    fleet.service.delete_job(&JobId::new("J"), &fleet.cancel).await.unwrap();
    let writes = fleet.store.writes();

    let result = fleet.beat("a", vec![Fleet::running(&active)]).await;

    assert_eq!(result.entries[0].instruction, HeartbeatInstruction::CancelProcessing);
    assert_eq!(fleet.store.writes(), writes);
}

#[tokio::test]
async fn edited_job_is_pushed_to_running_workers() {
    let fleet = Fleet::new();
    let (active, _) = active_and_passive(&fleet).await;

    fleet
        .service
        .create_or_update_job(
            &JobId::new("J"),
            |job| {
                job.configuration = Some(serde_json::json!({ "poll_ms": 250 }));
                true
            },
            &fleet.cancel,
        )
        .await
        .unwrap();

    let result = fleet.beat("a", vec![Fleet::running(&active)]).await;
    let updated = result.entries[0].updated_job.as_ref().unwrap();
    assert_eq!(updated.job.configuration, Some(serde_json::json!({ "poll_ms": 250 })));
    assert_eq!(updated.process_mode, ProcessMode::Active);
    assert_eq!(result.entries[0].instruction, HeartbeatInstruction::Keep);

    // Once the worker reports the new hash the definition is no longer sent
    let current = JobHeartbeat {
        job_hash: updated.job.content_hash().unwrap(),
        ..Fleet::running(&active)
    };
    let result = fleet.beat("a", vec![current]).await;
    assert!(result.entries[0].updated_job.is_none());
}
