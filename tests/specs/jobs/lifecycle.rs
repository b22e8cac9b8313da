// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs
//!
//! Verify cancel, restart and update behave the same no matter how often
//! they are repeated.

use crate::prelude::*;
use ef_core::RedundancyConfig;

#[tokio::test]
async fn cancel_twice_writes_once() {
    let fleet = Fleet::new();
    fleet.create(Job::builder().id("J").build()).await;
    let id = JobId::new("J");

    let first = fleet.service.cancel_job(&id, &fleet.cancel).await.unwrap();
    let writes = fleet.store.writes();
    let second = fleet.service.cancel_job(&id, &fleet.cancel).await.unwrap();

    assert_eq!(first.status(), JobStatus::Canceled);
    assert_eq!(second.status(), JobStatus::Canceled);
    assert_eq!(fleet.store.writes(), writes);
}

#[tokio::test]
async fn restart_reactivates_and_is_idempotent() {
    let fleet = Fleet::new();
    fleet.create(Job::builder().id("J").build()).await;
    let id = JobId::new("J");
    fleet.service.cancel_job(&id, &fleet.cancel).await.unwrap();

    let restarted = fleet.service.restart_job(&id, &fleet.cancel).await.unwrap();
    let writes = fleet.store.writes();
    let again = fleet.service.restart_job(&id, &fleet.cancel).await.unwrap();

    assert_eq!(restarted.status(), JobStatus::Active);
    assert_eq!(again.status(), JobStatus::Active);
    assert_eq!(fleet.store.writes(), writes);
    assert_eq!(fleet.pull("w1", &[], 1).await.len(), 1);
}

#[tokio::test]
async fn deleted_status_is_terminal() {
    let fleet = Fleet::new();
    fleet.create(Job::builder().id("J").build()).await;
    let id = JobId::new("J");
    fleet
        .service
        .create_or_update_job(
            &id,
            |job| {
                job.lifetime.status = JobStatus::Deleted;
                true
            },
            &fleet.cancel,
        )
        .await
        .unwrap();
    let writes = fleet.store.writes();

    let restarted = fleet.service.restart_job(&id, &fleet.cancel).await.unwrap();
    let canceled = fleet.service.cancel_job(&id, &fleet.cancel).await.unwrap();

    assert_eq!(restarted.status(), JobStatus::Deleted);
    assert_eq!(canceled.status(), JobStatus::Deleted);
    assert_eq!(fleet.store.writes(), writes);
}

#[tokio::test]
async fn redundancy_change_forgets_assignments() {
    let fleet = Fleet::new();
    fleet.create(Job::builder().id("J").redundancy(1, 1).build()).await;
    fleet.pull("w1", &[], 1).await;
    fleet.pull("w2", &[], 1).await;
    assert_eq!(fleet.job("J").await.processing_status().len(), 2);

    let job = fleet
        .service
        .create_or_update_job(
            &JobId::new("J"),
            |job| {
                job.redundancy = RedundancyConfig::new(2, 0);
                true
            },
            &fleet.cancel,
        )
        .await
        .unwrap();

    assert!(job.processing_status().is_empty());
    assert!(fleet.job("J").await.processing_status().is_empty());
    // Both slots are open again
    assert_eq!(fleet.pull("w3", &[], 1).await[0].process_mode, ProcessMode::Active);
    assert_eq!(fleet.pull("w4", &[], 1).await[0].process_mode, ProcessMode::Active);
}

#[tokio::test]
async fn create_or_update_is_an_upsert() {
    let fleet = Fleet::new();
    let id = JobId::new("J");
    let set_name = |name: &'static str| {
        move |job: &mut Job| {
            job.name = Some(name.to_string());
            true
        }
    };

    let created = fleet.service.create_or_update_job(&id, set_name("v1"), &fleet.cancel).await;
    let updated = fleet.service.create_or_update_job(&id, set_name("v2"), &fleet.cancel).await;

    assert_eq!(created.unwrap().name.as_deref(), Some("v1"));
    let updated = updated.unwrap();
    assert_eq!(updated.name.as_deref(), Some("v2"));
    similar_asserts::assert_eq!(fleet.job("J").await, updated);
}

#[tokio::test]
async fn listing_pages_through_every_job() {
    let fleet = Fleet::new();
    for i in 0..7 {
        fleet.create(Job::builder().id(format!("job-{i:02}")).build()).await;
    }

    let mut seen = Vec::new();
    let mut continuation: Option<String> = None;
    loop {
        let page =
            fleet.service.list_jobs(continuation.as_deref(), 3, &fleet.cancel).await.unwrap();
        seen.extend(page.items.into_iter().map(|j| j.id.to_string()));
        match page.continuation {
            Some(next) => continuation = Some(next),
            None => break,
        }
    }

    let expected: Vec<_> = (0..7).map(|i| format!("job-{i:02}")).collect();
    assert_eq!(seen, expected);
}
