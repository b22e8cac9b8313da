// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const STALE: Duration = Duration::from_secs(60);
const NOW: u64 = 10_000_000;

fn map(entries: &[(&str, Option<ProcessMode>, u64)]) -> ProcessingStatusMap {
    entries
        .iter()
        .map(|(id, mode, at)| (WorkerId::new(*id), ProcessingStatus::new(*mode, *at)))
        .collect()
}

#[yare::parameterized(
    fresh          = { NOW,              true },
    almost_stale   = { NOW - 59_999,     true },
    exactly_stale  = { NOW - 60_000,     false },
    long_gone      = { NOW - 3_600_000,  false },
)]
fn liveness_cutoff_is_exclusive(last_heartbeat: u64, live: bool) {
    let status = ProcessingStatus::new(Some(ProcessMode::Active), last_heartbeat);
    assert_eq!(status.is_live(NOW, STALE), live);
}

#[test]
fn liveness_near_epoch_does_not_underflow() {
    let status = ProcessingStatus::new(Some(ProcessMode::Active), 10);
    assert!(status.is_live(20, STALE));
}

#[test]
fn count_live_ignores_stale_and_modeless_entries() {
    let statuses = map(&[
        ("a", Some(ProcessMode::Active), NOW),
        ("b", Some(ProcessMode::Active), NOW - 120_000),
        ("c", Some(ProcessMode::Passive), NOW),
        ("d", None, NOW),
    ]);
    assert_eq!(statuses.count_live(ProcessMode::Active, NOW, STALE), 1);
    assert_eq!(statuses.count_live(ProcessMode::Passive, NOW, STALE), 1);
}

#[test]
fn count_live_others_excludes_the_asking_worker() {
    let statuses = map(&[
        ("a", Some(ProcessMode::Active), NOW),
        ("b", Some(ProcessMode::Active), NOW),
    ]);
    let a = WorkerId::new("a");
    assert_eq!(statuses.count_live_others(ProcessMode::Active, &a, NOW, STALE), 1);
}

#[test]
fn last_active_heartbeat_includes_stale_actives() {
    let statuses = map(&[
        ("a", Some(ProcessMode::Active), NOW - 500_000),
        ("b", Some(ProcessMode::Active), NOW - 400_000),
        ("c", Some(ProcessMode::Passive), NOW),
    ]);
    assert_eq!(statuses.last_active_heartbeat_ms(), Some(NOW - 400_000));
}

#[test]
fn last_active_heartbeat_absent_without_actives() {
    let statuses = map(&[("c", Some(ProcessMode::Passive), NOW)]);
    assert_eq!(statuses.last_active_heartbeat_ms(), None);
}

#[test]
fn set_mode_only_touches_existing_entries() {
    let mut statuses = map(&[("a", Some(ProcessMode::Passive), NOW)]);
    assert!(statuses.set_mode(&WorkerId::new("a"), ProcessMode::Active));
    assert!(!statuses.set_mode(&WorkerId::new("z"), ProcessMode::Active));
    assert_eq!(
        statuses.get(&WorkerId::new("a")).and_then(|s| s.process_mode),
        Some(ProcessMode::Active)
    );
    assert_eq!(statuses.len(), 1);
}

#[test]
fn serializes_as_plain_object_keyed_by_worker() {
    let statuses = map(&[("w1", Some(ProcessMode::Active), 5)]);
    let json = serde_json::to_value(&statuses).unwrap();
    let expected =
        serde_json::json!({"w1": {"process_mode": "active", "last_known_heartbeat_ms": 5}});
    assert_eq!(json, expected);
}
