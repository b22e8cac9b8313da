// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job event hook specs
//!
//! Verify handlers observe creates and deletes in order, and can veto them.

use crate::prelude::*;

#[tokio::test]
async fn create_and_delete_notify_handlers_in_order() {
    let fleet = Fleet::with_handlers(&["scheduler", "audit"]);
    fleet.create(Job::builder().id("J").build()).await;
    fleet.service.delete_job(&JobId::new("J"), &fleet.cancel).await.unwrap();

    let expected: Vec<(String, JobEvent)> = [
        ("scheduler", JobEvent::Creating),
        ("audit", JobEvent::Creating),
        ("scheduler", JobEvent::Created),
        ("audit", JobEvent::Created),
        ("scheduler", JobEvent::Deleting),
        ("audit", JobEvent::Deleting),
        ("scheduler", JobEvent::Deleted),
        ("audit", JobEvent::Deleted),
    ]
    .into_iter()
    .map(|(name, event)| (name.to_string(), event))
    .collect();
    similar_asserts::assert_eq!(fleet.log.events(), expected);
    assert!(fleet.log.calls().iter().all(|c| c.job_id == "J"));
}

#[tokio::test]
async fn vetoed_create_leaves_nothing_behind() {
    let log = HookLog::new();
    let gate = RecordingHandler::new("gate", &log);
    gate.fail_on(JobEvent::Creating);
    let jobs = JobRepository::new(Arc::new(MemoryStore::<Job>::new()));
    let service =
        JobService::new(jobs, JobEvents::new().with(Arc::new(gate)), FakeClock::at(START_MS));
    let cancel = CancellationToken::new();

    let err = service.create_job(Job::builder().id("J").build(), &cancel).await.unwrap_err();

    assert!(matches!(err, EngineError::Hook(_)), "got {err:?}");
    assert!(service.get_job(&JobId::new("J"), &cancel).await.unwrap().is_none());
    assert_eq!(
        log.events(),
        [("gate".to_string(), JobEvent::Creating), ("gate".to_string(), JobEvent::Deleted)]
    );
}
