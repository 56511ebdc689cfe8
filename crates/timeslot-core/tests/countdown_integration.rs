//! Integration tests for countdown sessions against the SQLite store.
//!
//! Covers the full life of a slot: creation, a run interrupted by closing
//! the session, reopening, suspension compensation and stop/reset.

use chrono::{Duration, Utc};
use timeslot_core::countdown::HostLifecycle;
use timeslot_core::storage::CountdownConfig;
use timeslot_core::{
    CountdownSession, CountdownState, Event, NewSlot, SlotService, SlotStore, SqliteSlotStore,
    Window,
};

fn service_with_slot(minutes: u32) -> (SlotService<SqliteSlotStore>, String) {
    let service = SlotService::new(SqliteSlotStore::open_in_memory().unwrap());
    let mut new = NewSlot::new("Study", 0, minutes, Window::Days(5));
    new.tasks = vec!["chapter 1".into(), "exercises".into()];
    let slot = service.create(new, Utc::now()).unwrap();
    (service, slot.id)
}

#[test]
fn test_progress_survives_reopen() {
    let (service, id) = service_with_slot(2);
    let config = CountdownConfig::default();

    {
        let mut session = service.open_session(&id, &config).unwrap();
        assert_eq!(session.state(), CountdownState::Paused);
        session.resume();
        for _ in 0..15 {
            session.tick();
        }
        assert_eq!(session.seconds_left(), 105);
        // Last checkpoint was at 110.
        assert_eq!(service.get(&id).unwrap().timer.seconds_left, 110);
        session.flush();
    }

    let session = service.open_session(&id, &config).unwrap();
    assert_eq!(session.state(), CountdownState::Running);
    assert_eq!(session.seconds_left(), 105);
}

#[test]
fn test_stop_resets_display_and_counts() {
    let (service, id) = service_with_slot(2);
    let config = CountdownConfig::default();
    let mut session = service.open_session(&id, &config).unwrap();

    session.resume();
    for _ in 0..10 {
        session.tick();
    }
    assert_eq!(session.seconds_left(), 110);

    let request = session.request_stop().unwrap();
    let event = session.confirm_stop(request);
    assert!(matches!(event, Some(Event::CountdownCancelled { times_stopped: 1, .. })));

    let stored = service.get(&id).unwrap();
    assert_eq!(stored.timer.seconds_left, 120);
    assert!(!stored.timer.is_running);
    assert_eq!(stored.timer.times_stopped, 1);

    // Cancelled is not persisted: a fresh session starts paused.
    drop(session);
    let session = service.open_session(&id, &config).unwrap();
    assert_eq!(session.state(), CountdownState::Paused);
}

#[test]
fn test_background_gap_completes_countdown() {
    let (service, id) = service_with_slot(1);
    let config = CountdownConfig::default();
    let mut session = service.open_session(&id, &config).unwrap();
    session.resume();

    let t0 = Utc::now();
    session.on_suspend(t0);
    let event = session.on_resume(t0 + Duration::seconds(90));
    assert!(matches!(event, Some(Event::CountdownCompleted { .. })));
    assert_eq!(session.state(), CountdownState::Completed);

    let stored = service.get(&id).unwrap();
    assert_eq!(stored.timer.seconds_left, 0);
    assert!(!stored.timer.is_running);

    assert!(session.reset().is_some());
    assert_eq!(service.get(&id).unwrap().timer.seconds_left, 60);
}

#[test]
fn test_task_toggle_keeps_timer_progress() {
    let (service, id) = service_with_slot(2);
    let config = CountdownConfig::default();
    let mut session = service.open_session(&id, &config).unwrap();
    session.resume();
    for _ in 0..10 {
        session.tick();
    }

    let task_id = session.tasks()[1].id.clone();
    session.toggle_task(&task_id);

    let stored = service.get(&id).unwrap();
    assert!(stored.tasks[1].completed);
    assert!(!stored.tasks[0].completed);
    assert_eq!(stored.timer.seconds_left, 110);
    assert_eq!(session.snapshot().completed_tasks, 1);
}

#[test]
fn test_session_updates_do_not_clobber_other_fields() {
    let (service, id) = service_with_slot(2);
    let config = CountdownConfig::default();
    let mut session = CountdownSession::open(service.store(), &id, &config).unwrap();

    // Another writer renames the slot while the session is open.
    let mut renamed = service.get(&id).unwrap();
    renamed.title = "Renamed".into();
    service.store().save_one(&renamed).unwrap();

    session.resume();
    assert_eq!(service.get(&id).unwrap().title, "Renamed");
}
