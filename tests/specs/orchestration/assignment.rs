// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job assignment specs
//!
//! Verify workers receive jobs they are eligible for, up to each job's
//! redundancy policy.

use crate::prelude::*;

fn site_job(id: &str, site: &str, active: u32, passive: u32) -> Job {
    Job::builder().id(id).demand(Demand::equals("site", site)).redundancy(active, passive).build()
}

#[tokio::test]
async fn eligible_worker_gets_job_and_keeps_it() {
    let fleet = Fleet::new();
    fleet.create(site_job("J", "A", 1, 0)).await;

    let w1 = fleet.pull("w1", &[("site", "A")], 1).await;
    assert_eq!(w1.len(), 1);
    assert_eq!(w1[0].job.id, "J");
    assert_eq!(w1[0].process_mode, ProcessMode::Active);

    let w2 = fleet.pull("w2", &[("site", "B")], 1).await;
    assert!(w2.is_empty(), "demand mismatch must not assign");

    let result = fleet.beat("w1", vec![Fleet::running(&w1[0])]).await;
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].instruction, HeartbeatInstruction::Keep);
    assert!(result.entries[0].updated_job.is_none());
}

#[tokio::test]
async fn one_active_one_passive_and_no_more() {
    let fleet = Fleet::new();
    fleet.create(site_job("J", "A", 1, 1)).await;

    let mut modes = Vec::new();
    for worker in ["w1", "w2", "w3"] {
        modes.push(fleet.pull(worker, &[("site", "A")], 1).await.first().map(|i| i.process_mode));
    }

    assert_eq!(modes, [Some(ProcessMode::Active), Some(ProcessMode::Passive), None]);
    let job = fleet.job("J").await;
    assert_eq!(job.processing_status().len(), 2);
    assert_eq!(Fleet::mode_of(&job, "w1"), Some(ProcessMode::Active));
    assert_eq!(Fleet::mode_of(&job, "w2"), Some(ProcessMode::Passive));
    assert_eq!(Fleet::mode_of(&job, "w3"), None);
}

#[tokio::test]
async fn worker_without_capabilities_only_gets_unconstrained_jobs() {
    let fleet = Fleet::new();
    fleet.create(site_job("constrained", "A", 1, 0)).await;
    fleet.create(Job::builder().id("open").build()).await;

    let pulled = fleet
        .orchestrator
        .get_available_jobs(&WorkerId::new("w1"), None, 10, &fleet.cancel)
        .await
        .unwrap();

    assert_eq!(pulled.iter().map(|i| i.job.id.as_str()).collect::<Vec<_>>(), ["open"]);
}

#[tokio::test]
async fn canceled_jobs_are_not_assigned() {
    let fleet = Fleet::new();
    fleet.create(site_job("J", "A", 1, 0)).await;
    fleet.service.cancel_job(&JobId::new("J"), &fleet.cancel).await.unwrap();

    assert!(fleet.pull("w1", &[("site", "A")], 1).await.is_empty());
}

#[tokio::test]
async fn pulls_are_recorded_per_worker_and_heartbeats_register_workers() {
    let fleet = Fleet::new();
    fleet.create(site_job("J", "A", 1, 0)).await;
    let pulled = fleet.pull("w1", &[("site", "A")], 1).await;

    fleet.clock.advance(Duration::from_secs(5));
    fleet.beat("w1", vec![Fleet::running(&pulled[0])]).await;

    let record =
        fleet.workers.get(&WorkerId::new("w1"), &fleet.cancel).await.unwrap().unwrap();
    assert_eq!(record.last_seen_ms, START_MS + 5_000);
    let job = fleet.job("J").await;
    let status = job.processing_status().get(&WorkerId::new("w1")).unwrap();
    assert_eq!(status.last_known_heartbeat_ms, START_MS + 5_000);
}
