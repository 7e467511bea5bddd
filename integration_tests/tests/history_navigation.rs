mod common;

use common::{date, mirror_history, pos};
use mirror_core::{reduce, Fenced, LoadOutcome, MirrorStore, ViewAction, ViewMode, ViewState};

#[test]
fn change_navigation_walks_the_history() {
    let history = mirror_history().history();

    assert_eq!(history.most_recent_change(date(2023, 6, 15)), Some(date(2023, 6, 1)));
    assert_eq!(history.next_change(date(2023, 6, 1)), Some(date(2023, 7, 15)));
    assert_eq!(history.prev_change(date(2023, 6, 1)), Some(date(2023, 5, 1)));
    assert_eq!(history.next_change(date(2023, 7, 15)), None);
    assert_eq!(history.prev_change(date(2023, 5, 1)), None);
    assert_eq!(history.most_recent_change(date(2023, 1, 1)), None);
}

#[test]
fn position_history_is_newest_first() {
    let history = mirror_history().history();
    let a2: Vec<_> = history
        .position_history(pos("A2"))
        .into_iter()
        .map(|record| (record.date, record.maybe_id))
        .collect();
    assert_eq!(
        a2,
        vec![
            (date(2023, 6, 1), None),
            (date(2023, 5, 1), Some("SN002".to_string())),
        ]
    );
}

#[test]
fn only_date_changes_trigger_reloads() {
    let view = ViewState::new(date(2023, 6, 1));
    assert!(!ViewAction::SetViewMode(ViewMode::Status).needs_reload(&view));
    assert!(!ViewAction::SetShowSpares(true).needs_reload(&view));
    assert!(!ViewAction::SetReferenceDate(date(2023, 6, 1)).needs_reload(&view));
    assert!(ViewAction::SetReferenceDate(date(2023, 7, 15)).needs_reload(&view));

    let moved = reduce(&view, ViewAction::SetReferenceDate(date(2023, 7, 15)));
    assert_eq!(moved.reference_date, date(2023, 7, 15));
    assert_eq!(moved.view_mode, view.view_mode);
}

#[test]
fn rapid_date_changes_publish_only_the_last_load() {
    let fixture = mirror_history();
    let mut store = MirrorStore::new();

    let june = store.begin_load();
    let july = store.begin_load();

    let july_data = fixture.data_on(date(2023, 7, 15));
    let june_data = fixture.data_on(date(2023, 6, 15));
    assert_eq!(store.apply(Fenced::new(july, july_data)), LoadOutcome::Applied);
    assert_eq!(store.apply(Fenced::new(june, june_data)), LoadOutcome::Stale);

    assert_eq!(store.data().most_recent_change, Some(date(2023, 7, 15)));
    assert_eq!(store.data().occupant(pos("D82")), Some("SN002"));
}
