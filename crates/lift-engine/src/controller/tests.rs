use lift_core::entities::{DateRange, DraftUpdate, OrderUpdate, WorkoutEntry};
use lift_core::enums::ErrorKind;
use lift_core::ids::{EntryId, ExerciseId, PersonId};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

use super::*;
use crate::error::{FailedOperation, ReconcileError, SessionError};
use crate::test_support::helpers::{Call, CallKind, MemoryGateway, day, entry, entry_on, other_day};

fn controller(rows: Vec<WorkoutEntry>) -> SessionController<MemoryGateway> {
    SessionController::new(MemoryGateway::new(rows), SessionOptions::default())
}

async fn opened(rows: Vec<WorkoutEntry>) -> SessionController<MemoryGateway> {
    let ctrl = controller(rows);
    ctrl.select_person(PersonId(1));
    ctrl.open_day(day()).await.unwrap();
    ctrl
}

fn layout(projection: &Projection) -> Vec<(u32, Vec<i64>)> {
    projection
        .groups
        .iter()
        .map(|g| (g.group_number, g.entries.iter().map(|e| e.id.get()).collect()))
        .collect()
}

/// Every stored `(date, group)` holds order indices `0..n`.
fn assert_dense(ctrl: &SessionController<MemoryGateway>) {
    let mut buckets: BTreeMap<(chrono::NaiveDate, u32), Vec<u32>> = BTreeMap::new();
    for row in ctrl.gateway().rows() {
        buckets.entry(row.bucket()).or_default().push(row.order_index);
    }
    for (bucket, mut indices) in buckets {
        indices.sort_unstable();
        let expected: Vec<u32> = (0..).take(indices.len()).collect();
        assert_eq!(indices, expected, "{bucket:?} is not dense");
    }
}

fn squat() -> WorkoutEntry {
    WorkoutEntry {
        sets: 5,
        reps: 5,
        ..entry(2, 20, 1, 1)
    }
}

#[tokio::test]
async fn open_day_requires_a_person() {
    let ctrl = controller(vec![]);
    let err = ctrl.open_day(day()).await.unwrap_err();
    assert!(matches!(err, SessionError::NoPersonSelected));
}

#[tokio::test]
async fn open_day_loads_groups_and_form() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), squat(), entry_on(other_day(), 3, 30, 1, 0)]).await;
    let projection = ctrl.projection();
    assert_eq!(layout(&projection), vec![(1, vec![1, 2])]);
    assert_eq!(projection.drafts.len(), 2);
    assert!(!projection.dirty);
    assert!(!projection.busy);
}

#[tokio::test]
async fn drag_within_group_persists_one_batch() {
    let ctrl = opened(vec![entry(5, 50, 1, 0), entry(7, 70, 1, 1)]).await;

    let projection = ctrl.begin_drag(EntryId(7), 1, Some(0)).await.unwrap();

    assert_eq!(layout(&projection), vec![(1, vec![7, 5])]);
    assert_eq!(
        ctrl.gateway().writes(),
        vec![Call::Reorder(vec![
            OrderUpdate::new(EntryId(7), 0),
            OrderUpdate::new(EntryId(5), 1),
        ])]
    );
    assert_eq!(projection.last_error, None);
}

#[tokio::test]
async fn drop_in_place_makes_no_call() {
    let ctrl = opened(vec![entry(5, 50, 1, 0), entry(7, 70, 1, 1)]).await;
    ctrl.begin_drag(EntryId(7), 1, None).await.unwrap();
    assert!(ctrl.gateway().writes().is_empty());
}

#[tokio::test]
async fn failed_drag_shows_move_then_rolls_back() {
    let gateway = MemoryGateway::new(vec![entry(5, 50, 1, 0), entry(7, 70, 1, 1)]).with_yields(2);
    gateway.fail(CallKind::Reorder);
    let ctrl = SessionController::new(gateway, SessionOptions::default());
    ctrl.select_person(PersonId(1));
    ctrl.open_day(day()).await.unwrap();

    let (result, during) = tokio::join!(ctrl.begin_drag(EntryId(7), 1, Some(0)), async {
        tokio::task::yield_now().await;
        ctrl.projection()
    });

    assert_eq!(layout(&during), vec![(1, vec![7, 5])]);
    assert!(during.busy);

    let err = result.unwrap_err();
    assert!(matches!(err, SessionError::RolledBack { operation: "reorder", .. }));
    let after = ctrl.projection();
    assert_eq!(layout(&after), vec![(1, vec![5, 7])]);
    assert_eq!(after.last_error, Some(ErrorKind::Transport));
    assert!(!after.busy);
}

#[tokio::test]
async fn drag_into_new_group_fills_placeholder() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1), entry(3, 30, 1, 2)]).await;

    let group = ctrl.create_group().unwrap();
    assert_eq!(group, 2);
    assert_eq!(layout(&ctrl.projection()), vec![(1, vec![1, 2, 3]), (2, vec![])]);

    let projection = ctrl.begin_drag(EntryId(1), group, None).await.unwrap();
    assert_eq!(layout(&projection), vec![(1, vec![2, 3]), (2, vec![1])]);

    let rows = ctrl.gateway().rows();
    let moved = rows.iter().find(|e| e.id == EntryId(1)).unwrap();
    assert_eq!((moved.group_number, moved.order_index), (2, 0));
    // The placeholder is gone, so the next group is 3.
    assert_eq!(ctrl.create_group().unwrap(), 3);
}

#[tokio::test]
async fn failed_cross_group_drag_restores_placeholder() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1)]).await;
    let group = ctrl.create_group().unwrap();
    ctrl.gateway().fail(CallKind::Reorder);

    assert!(ctrl.begin_drag(EntryId(2), group, None).await.is_err());
    assert_eq!(layout(&ctrl.projection()), vec![(1, vec![1, 2]), (2, vec![])]);
}

#[tokio::test]
async fn delete_removes_entry_and_rolls_back_on_failure() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1), entry(3, 30, 1, 2)]).await;

    ctrl.gateway().fail(CallKind::Delete);
    let err = ctrl.delete_entry(EntryId(2)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(layout(&ctrl.projection()), vec![(1, vec![1, 2, 3])]);

    assert_dense(&ctrl);

    ctrl.gateway().heal();
    let projection = ctrl.delete_entry(EntryId(2)).await.unwrap();
    assert_eq!(layout(&projection), vec![(1, vec![1, 3])]);
    assert_eq!(projection.last_error, None);
    assert_eq!(ctrl.gateway().rows().len(), 2);
    assert_dense(&ctrl);
}

#[tokio::test]
async fn delete_closes_the_gap_so_an_unchanged_save_writes_nothing() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1), entry(3, 30, 1, 2)]).await;

    ctrl.delete_entry(EntryId(1)).await.unwrap();

    let mut rows = ctrl.gateway().rows();
    rows.sort_by_key(|e| e.order_index);
    let placed: Vec<(i64, u32)> = rows.iter().map(|e| (e.id.get(), e.order_index)).collect();
    assert_eq!(placed, vec![(2, 0), (3, 1)]);
    assert_eq!(
        ctrl.gateway().writes(),
        vec![
            Call::Delete(EntryId(1)),
            Call::Reorder(vec![OrderUpdate::new(EntryId(2), 0), OrderUpdate::new(EntryId(3), 1)]),
        ]
    );

    let writes = ctrl.gateway().writes().len();
    let report = ctrl.save_session(false).await.unwrap();
    assert!(report.is_empty());
    assert_eq!(ctrl.gateway().writes().len(), writes);
}

#[tokio::test]
async fn deleting_the_last_member_sends_only_the_delete() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1)]).await;
    ctrl.delete_entry(EntryId(2)).await.unwrap();
    assert_eq!(ctrl.gateway().writes(), vec![Call::Delete(EntryId(2))]);
    assert_dense(&ctrl);
}

#[tokio::test]
async fn interrupted_delete_reloads_instead_of_undoing() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1), entry(3, 30, 1, 2)]).await;
    ctrl.gateway().fail(CallKind::Reorder);

    let err = ctrl.delete_entry(EntryId(1)).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Interrupted {
            operation: "delete",
            completed: 1,
            resynced: true,
            ..
        }
    ));
    let projection = ctrl.projection();
    assert_eq!(layout(&projection), vec![(1, vec![2, 3])]);
    assert_eq!(projection.last_error, Some(ErrorKind::Transport));

    // The stored group still has a gap; the next save closes it.
    ctrl.gateway().heal();
    let report = ctrl.save_session(false).await.unwrap();
    assert_eq!(report.reordered, 2);
    assert_dense(&ctrl);
}

#[tokio::test]
async fn delete_of_unknown_entry_is_rejected() {
    let ctrl = opened(vec![entry(1, 10, 1, 0)]).await;
    let err = ctrl.delete_entry(EntryId(42)).await.unwrap_err();
    assert!(matches!(err, SessionError::EntryNotFound(EntryId(42))));
    assert!(ctrl.gateway().writes().is_empty());
}

#[tokio::test]
async fn save_replaces_only_the_edited_entry() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), squat()]).await;

    let projection = ctrl.update_draft(1, DraftUpdate::Reps(3)).unwrap();
    assert!(projection.dirty);

    let report = ctrl.save_session(false).await.unwrap();
    assert_eq!(report.deleted, vec![EntryId(2)]);
    assert_eq!(report.inserted.len(), 1);

    let writes = ctrl.gateway().writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], Call::Delete(EntryId(2)));
    let Call::Create(created) = &writes[1] else {
        panic!("expected a create, got {:?}", writes[1]);
    };
    assert_eq!(
        (created.exercise_id, created.sets, created.reps, created.order_index),
        (ExerciseId(20), 5, 3, 1)
    );

    let after = ctrl.projection();
    assert!(!after.dirty);
    assert_eq!(after.groups[0].entries[1].reps, 3);
}

#[tokio::test]
async fn unchanged_form_saves_nothing() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), squat()]).await;
    let report = ctrl.save_session(false).await.unwrap();
    assert!(report.is_empty());
    assert!(ctrl.gateway().writes().is_empty());
}

#[tokio::test]
async fn clearing_the_day_waits_for_confirmation() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), squat()]).await;
    ctrl.remove_draft_row(1).unwrap();
    ctrl.remove_draft_row(0).unwrap();

    let err = ctrl.save_session(false).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Reconcile(ReconcileError::ConfirmationRequired { deletes: 2 })
    ));
    assert_eq!(ctrl.projection().last_error, Some(ErrorKind::ConfirmationRequired));
    assert!(ctrl.gateway().writes().is_empty());

    let report = ctrl.save_session(true).await.unwrap();
    assert_eq!(report.deleted, vec![EntryId(1), EntryId(2)]);
    assert!(ctrl.gateway().rows().is_empty());
    assert_eq!(ctrl.projection().entry_count(), 0);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_gateway() {
    let ctrl = opened(vec![entry(1, 10, 1, 0)]).await;
    ctrl.add_draft_row().unwrap();
    ctrl.update_draft(1, DraftUpdate::Sets(4)).unwrap();

    let err = ctrl.save_session(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(ctrl.projection().last_error, Some(ErrorKind::Validation));
    assert!(ctrl.gateway().writes().is_empty());
}

#[tokio::test]
async fn failed_save_stops_and_resyncs() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), squat()]).await;
    ctrl.update_draft(0, DraftUpdate::Weight(Some(60.0))).unwrap();
    ctrl.update_draft(1, DraftUpdate::Weight(Some(100.0))).unwrap();
    ctrl.gateway().fail(CallKind::Create);

    let err = ctrl.save_session(false).await.unwrap_err();
    let SessionError::SaveFailed {
        failed,
        completed,
        resynced,
        ..
    } = err
    else {
        panic!("expected SaveFailed, got {err:?}");
    };
    assert_eq!(failed, FailedOperation::Insert(ExerciseId(10)));
    assert_eq!(completed, 2);
    assert!(resynced);

    // Both deletes went through, so the resynced day is empty but the edits survive.
    let projection = ctrl.projection();
    assert_eq!(projection.entry_count(), 0);
    assert!(projection.dirty);
    assert_eq!(projection.drafts.len(), 2);
    assert_eq!(projection.last_error, Some(ErrorKind::Transport));

    assert_dense(&ctrl);

    ctrl.gateway().heal();
    let report = ctrl.save_session(false).await.unwrap();
    assert_eq!(report.inserted.len(), 2);
    assert_eq!(ctrl.projection().entry_count(), 2);
    assert_dense(&ctrl);
}

#[tokio::test]
async fn removing_a_middle_row_keeps_the_group_dense() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1), entry(3, 30, 1, 2)]).await;
    ctrl.remove_draft_row(1).unwrap();

    let report = ctrl.save_session(false).await.unwrap();
    assert_eq!(report.deleted, vec![EntryId(2)]);
    assert_eq!(report.reordered, 1);
    assert_dense(&ctrl);

    assert!(ctrl.save_session(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn drag_keeps_unsaved_edits() {
    let ctrl = opened(vec![entry(5, 50, 1, 0), entry(7, 70, 1, 1)]).await;
    ctrl.update_draft(0, DraftUpdate::Notes(Some("slow eccentric".into())))
        .unwrap();
    let projection = ctrl.begin_drag(EntryId(7), 1, Some(0)).await.unwrap();
    assert!(projection.dirty);
    assert_eq!(projection.drafts[0].notes.as_deref(), Some("slow eccentric"));
}

#[tokio::test]
async fn writes_to_one_day_run_one_at_a_time() {
    let gateway = MemoryGateway::new(vec![
        entry(1, 10, 1, 0),
        entry(2, 20, 1, 1),
        entry(3, 30, 1, 2),
    ])
    .with_yields(3);
    let ctrl = SessionController::new(gateway, SessionOptions::default());
    ctrl.select_person(PersonId(1));
    ctrl.open_day(day()).await.unwrap();

    let (first, second) = tokio::join!(
        ctrl.begin_drag(EntryId(3), 1, Some(0)),
        ctrl.begin_drag(EntryId(1), 1, None),
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(ctrl.gateway().trace(), vec!["start", "end", "start", "end"]);
    assert_dense(&ctrl);
    assert_eq!(layout(&ctrl.projection()), vec![(1, vec![3, 2, 1])]);

    let mut rows = ctrl.gateway().rows();
    rows.sort_by_key(|e| e.order_index);
    let persisted: Vec<i64> = rows.iter().map(|e| e.id.get()).collect();
    assert_eq!(persisted, vec![3, 2, 1]);
}

#[tokio::test]
async fn late_result_updates_store_but_not_projection() {
    let gateway = MemoryGateway::new(vec![
        entry(1, 10, 1, 0),
        entry(2, 20, 1, 1),
        entry_on(other_day(), 3, 30, 1, 0),
    ])
    .with_yields(3);
    let ctrl = SessionController::new(gateway, SessionOptions::default());
    ctrl.select_person(PersonId(1));
    ctrl.open_day(day()).await.unwrap();
    let mut rx = ctrl.subscribe();

    let (deleted, ()) = tokio::join!(ctrl.delete_entry(EntryId(1)), async {
        ctrl.open_day(other_day()).await.unwrap();
        rx.borrow_and_update();
    });
    deleted.unwrap();

    assert!(!rx.has_changed().unwrap());
    assert_eq!(rx.borrow().date, Some(other_day()));

    ctrl.open_day(day()).await.unwrap();
    assert_eq!(layout(&ctrl.projection()), vec![(1, vec![2])]);
}

#[tokio::test]
async fn fetch_range_groups_each_day() {
    let ctrl = controller(vec![
        entry(1, 10, 1, 0),
        entry(2, 20, 2, 0),
        entry_on(other_day(), 3, 30, 1, 0),
    ]);
    ctrl.select_person(PersonId(1));

    let week = ctrl
        .fetch_range(DateRange::spanning(day(), 7).unwrap())
        .await
        .unwrap();

    assert_eq!(week.len(), 7);
    assert_eq!(week[&day()].len(), 2);
    assert_eq!(week[&other_day()][0].entries[0].id, EntryId(3));
    assert!(week.values().filter(|groups| groups.is_empty()).count() == 5);
}

#[tokio::test]
async fn fetch_failure_is_reported_as_transport() {
    let ctrl = controller(vec![]);
    ctrl.select_person(PersonId(1));
    ctrl.gateway().fail(CallKind::Fetch);

    let err = ctrl.open_day(day()).await.unwrap_err();
    assert!(matches!(err, SessionError::Fetch(_)));
    assert_eq!(ctrl.projection().last_error, Some(ErrorKind::Transport));
}

#[tokio::test]
async fn selecting_a_person_closes_the_day() {
    let ctrl = opened(vec![entry(1, 10, 1, 0)]).await;
    ctrl.create_group().unwrap();

    let projection = ctrl.select_person(PersonId(2));
    assert_eq!(projection.date, None);
    assert!(projection.groups.is_empty());
    assert!(matches!(ctrl.add_draft_row(), Err(SessionError::NoDayOpen)));
}

#[tokio::test]
async fn closing_the_day_drops_placeholders() {
    let ctrl = opened(vec![entry(1, 10, 1, 0)]).await;
    ctrl.create_group().unwrap();
    ctrl.close_day();
    ctrl.open_day(day()).await.unwrap();
    assert_eq!(layout(&ctrl.projection()), vec![(1, vec![1])]);
}

#[tokio::test]
async fn switching_days_forgets_idle_ones() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry_on(other_day(), 2, 20, 1, 0)]).await;
    ctrl.fetch_range(DateRange::spanning(day(), 7).unwrap())
        .await
        .unwrap();
    assert_eq!(ctrl.lock_state().stored_days(), 7);

    ctrl.open_day(other_day()).await.unwrap();
    assert_eq!(ctrl.lock_state().stored_days(), 1);
    assert_eq!(ctrl.inner.locks.len(), 1);

    ctrl.close_day();
    assert_eq!(ctrl.lock_state().stored_days(), 0);
}

#[tokio::test]
async fn fetch_range_after_eviction_shows_fetched_rows() {
    let ctrl = opened(vec![entry(1, 10, 1, 0), entry(2, 20, 1, 1)]).await;
    ctrl.delete_entry(EntryId(2)).await.unwrap();
    ctrl.close_day();

    let week = ctrl
        .fetch_range(DateRange::spanning(day(), 7).unwrap())
        .await
        .unwrap();
    assert_eq!(week[&day()][0].entries.len(), 1);
}
