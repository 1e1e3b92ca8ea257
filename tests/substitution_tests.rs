// tests/substitution_tests.rs
//
// Пакетные замены: сборка пар из выбора, проверка и атомарное применение.
//

use knights_rotation::domain::{EventKind, PlayerId, SubPair};
use knights_rotation::engine::{
    apply_batch, minutes_for, pair_selections, validate_batch, EngineError, IntervalBook,
};

fn pid(s: &str) -> PlayerId {
    PlayerId::from(s)
}

/// a, b, c на поле с нуля.
fn book_abc() -> IntervalBook {
    let mut book = IntervalBook::new();
    for p in ["a", "b", "c"] {
        book.open_interval(&pid(p), 0).unwrap();
    }
    book
}

#[test]
fn pair_selections_pairs_by_position() {
    let pairs = pair_selections(&[pid("a"), pid("b")], &[pid("x"), pid("y")]).unwrap();
    assert_eq!(pairs, vec![SubPair::new("x", "a"), SubPair::new("y", "b")]);
}

#[test]
fn pair_selections_rejects_uneven_lists() {
    let err = pair_selections(&[pid("a"), pid("b")], &[pid("x")]).unwrap_err();
    assert_eq!(err, EngineError::SelectionMismatch { off: 2, on: 1 });

    assert_eq!(pair_selections(&[], &[]).unwrap_err(), EngineError::EmptyBatch);
}

#[test]
fn batch_applies_all_pairs_at_one_timestamp() {
    let mut book = book_abc();

    let batch = apply_batch(
        &mut book,
        vec![SubPair::new("x", "a"), SubPair::new("y", "b")],
        300_000,
    )
    .unwrap();

    assert_eq!(batch.at_ms, 300_000);
    assert!(!book.is_on_field(&pid("a")));
    assert!(!book.is_on_field(&pid("b")));
    assert!(book.is_on_field(&pid("c")));
    assert!(book.is_on_field(&pid("x")));
    assert!(book.is_on_field(&pid("y")));
    assert_eq!(book.on_field_count(), 3, "размер поля не меняется");

    let minutes = book.minutes(400_000);
    assert_eq!(minutes_for(&minutes, &pid("a")), 300_000);
    assert_eq!(minutes_for(&minutes, &pid("x")), 100_000);
}

#[test]
fn batch_with_bad_pair_changes_nothing() {
    let mut book = book_abc();
    let before = book.clone();

    // вторая пара битая: z не на поле
    let err = apply_batch(
        &mut book,
        vec![SubPair::new("x", "a"), SubPair::new("y", "z")],
        300_000,
    )
    .unwrap_err();

    assert_eq!(err, EngineError::NotOnField(pid("z")));
    assert_eq!(book, before, "пакет отклоняется целиком");
}

#[test]
fn batch_rejects_player_already_on_field() {
    let book = book_abc();
    let err = validate_batch(&book, &[SubPair::new("b", "a")]).unwrap_err();
    assert_eq!(err, EngineError::AlreadyOnField(pid("b")));
}

#[test]
fn batch_rejects_duplicates() {
    let book = book_abc();

    let twice_off = [SubPair::new("x", "a"), SubPair::new("y", "a")];
    assert_eq!(
        validate_batch(&book, &twice_off).unwrap_err(),
        EngineError::DuplicateInBatch(pid("a"))
    );

    let twice_on = [SubPair::new("x", "a"), SubPair::new("x", "b")];
    assert_eq!(
        validate_batch(&book, &twice_on).unwrap_err(),
        EngineError::DuplicateInBatch(pid("x"))
    );
}

#[test]
fn batch_rejects_empty() {
    let mut book = book_abc();
    assert_eq!(apply_batch(&mut book, vec![], 0).unwrap_err(), EngineError::EmptyBatch);
}

#[test]
fn batch_event_carries_pairs_as_json() {
    let mut book = book_abc();
    let batch = apply_batch(&mut book, vec![SubPair::new("x", "a")], 42_000).unwrap();

    let event = batch.to_event().unwrap();
    assert_eq!(event.kind, EventKind::Sub);
    assert_eq!(event.at_ms, 42_000);
    assert_eq!(event.note.as_deref(), Some(r#"[{"onId":"x","offId":"a"}]"#));

    let pairs: Vec<SubPair> = event.payload().unwrap();
    assert_eq!(pairs, batch.pairs);
}

#[test]
fn batch_reports_clamped_close_when_clock_lags() {
    let mut book = IntervalBook::new();
    book.open_interval(&pid("a"), 50_000).unwrap();

    let batch = apply_batch(&mut book, vec![SubPair::new("x", "a")], 10_000).unwrap();

    assert_eq!(batch.closed.len(), 1);
    assert_eq!(batch.closed[0].player_id, pid("a"));
    assert_eq!(batch.closed[0].end_ms, Some(50_000), "конец прижат к началу");
    assert!(book.is_on_field(&pid("x")));
}
