// tests/audit_summary_tests.rs
//
// Журнал событий и итоги:
// 1) интервалы, восстановленные из журнала, совпадают с книгой сессии;
// 2) итоги матча: сортировка, суммы, отметки без игрока;
// 3) история: обрезка открытых интервалов по длительности матча.
//

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};

use knights_rotation::domain::{
    EventKind, MatchConfig, MatchEvent, MatchRecord, MatchStatus, Player, PlayerId,
    PlayingInterval, Roster,
};
use knights_rotation::engine::{
    latest_availability, on_field_ids, reconstruct_intervals, EngineError, MatchSession,
};
use knights_rotation::summary::{aggregate_history, build_summary, full_time_at, HistoryFilter};

fn pid(s: &str) -> PlayerId {
    PlayerId::from(s)
}

fn sorted(mut list: Vec<PlayingInterval>) -> Vec<PlayingInterval> {
    list.sort_by(|a, b| (a.start_ms, &a.player_id).cmp(&(b.start_ms, &b.player_id)));
    list
}

/// Матч с пакетом замен, ручными заменами и финальным свистком.
fn played_session() -> MatchSession {
    let mut s = MatchSession::new(9, MatchConfig::standard(), Roster::placeholder(12));
    let starters = s.default_starters();
    s.start_match(&starters).unwrap();
    s.start_clock();

    s.advance(240_000);
    s.suggest_rotation();
    s.confirm_batch().unwrap();

    s.advance(60_000);
    s.take_off(&pid("p5")).unwrap();
    s.advance(30_000);
    s.send_on(&pid("p1")).unwrap();
    s.record_event(EventKind::Try, Some(&pid("p1")), None).unwrap();

    s.advance(500_000);
    s.suggest_rotation();
    s.confirm_batch().unwrap();

    s.advance(370_000);
    s.end_match().unwrap();
    s
}

#[test]
fn journal_replay_matches_session_intervals() {
    let s = played_session();

    let book = reconstruct_intervals(s.events()).unwrap();

    assert_eq!(sorted(book.intervals().to_vec()), sorted(s.intervals().to_vec()));
    assert_eq!(book.on_field_count(), 0);
}

#[test]
fn journal_replay_of_live_match_keeps_open_intervals() {
    let mut s = MatchSession::new(3, MatchConfig::standard(), Roster::placeholder(10));
    let starters = s.default_starters();
    s.start_match(&starters).unwrap();
    s.start_clock();
    s.advance(100_000);
    s.suggest_rotation();
    s.confirm_batch().unwrap();

    let book = reconstruct_intervals(s.events()).unwrap();
    assert_eq!(book.on_field_ids(), on_field_ids(s.intervals()));
    assert_eq!(book.on_field_count(), 8);
}

#[test]
fn journal_with_broken_payload_is_reported() {
    let broken = MatchEvent::new(EventKind::Lineup, 0).with_note("not json");
    assert!(matches!(
        reconstruct_intervals(&[broken]).unwrap_err(),
        EngineError::MalformedEvent(_)
    ));

    let orphan = MatchEvent::new(EventKind::TakeOff, 1_000);
    assert!(reconstruct_intervals(&[orphan]).is_err());
}

#[test]
fn journal_latest_availability_wins() {
    let first = MatchEvent::with_payload(EventKind::Availability, 0, &vec![pid("a"), pid("b")]).unwrap();
    let second = MatchEvent::with_payload(EventKind::Availability, 10, &vec![pid("a")]).unwrap();

    let latest = latest_availability(&[first, second]).unwrap().unwrap();
    assert_eq!(latest.to_vec(), vec![pid("a")]);
    assert_eq!(latest_availability(&[]).unwrap(), None);
}

#[test]
fn summary_rows_sorted_by_minutes_with_totals() {
    let s = played_session();
    let end = full_time_at(s.events());
    assert_eq!(end, Some(1_200_000));

    let summary = build_summary(s.roster(), s.intervals(), s.events(), end);

    assert_eq!(summary.rows.len(), 12);
    for w in summary.rows.windows(2) {
        assert!(
            w[0].minutes_ms > w[1].minutes_ms
                || (w[0].minutes_ms == w[1].minutes_ms && w[0].player_id < w[1].player_id),
            "строки по убыванию минут, при равенстве по id"
        );
    }

    // 8 на поле весь матч, кроме 30 секунд после ручного ухода p5
    assert_eq!(summary.team_minutes_ms, 8 * 1_200_000 - 30_000);
    assert_eq!(summary.team_tally.tries, 1);
    let p1 = summary.rows.iter().find(|r| r.player_id == pid("p1")).unwrap();
    assert_eq!(p1.tally.tries, 1);
}

#[test]
fn summary_counts_unattributed_events_separately() {
    let roster = Roster::new(vec![Player::new("a", "Ann").with_shirt(4)]);
    let intervals = vec![PlayingInterval::open(pid("a"), 0)];
    let events = vec![
        MatchEvent::for_player(EventKind::Tackle, 10, pid("a")),
        MatchEvent::new(EventKind::Tackle, 20),
        MatchEvent::new(EventKind::Other, 30).with_note("rain"),
    ];

    let summary = build_summary(&roster, &intervals, &events, None);

    assert_eq!(summary.rows[0].minutes_ms, 0, "без границы открытый интервал нулевой");
    assert_eq!(summary.rows[0].shirt_number, Some(4));
    assert_eq!(summary.team_tally.tackles, 1);
    assert_eq!(summary.unattributed.tackles, 1);
    assert_eq!(summary.unattributed.other, 1);
}

#[test]
fn history_caps_open_intervals_at_match_length() {
    let start = Utc.with_ymd_and_hms(2025, 10, 4, 9, 0, 0).unwrap();
    let finished = MatchRecord {
        id: 1,
        opponent: "Wasps".into(),
        status: MatchStatus::Final,
        half_length_minutes: 10,
        max_on_field: 8,
        started_at: Some(start),
        completed_at: Some(start + Duration::minutes(25)),
    };
    let live = MatchRecord {
        id: 2,
        opponent: "Saints".into(),
        status: MatchStatus::Live,
        started_at: Some(start + Duration::days(7)),
        completed_at: None,
        ..finished.clone()
    };

    let mut intervals = BTreeMap::new();
    intervals.insert(
        1,
        vec![
            PlayingInterval::closed(pid("a"), 0, 600_000),
            PlayingInterval::open(pid("b"), 300_000),
        ],
    );
    intervals.insert(2, vec![PlayingInterval::open(pid("a"), 0)]);

    let mut events = BTreeMap::new();
    events.insert(
        1,
        vec![
            MatchEvent::for_player(EventKind::Try, 100, pid("a")),
            MatchEvent::for_player(EventKind::Try, 200, pid("b")),
            MatchEvent::new(EventKind::Tackle, 300),
            MatchEvent::new(EventKind::Sub, 400),
        ],
    );

    let rows = aggregate_history(
        &[finished, live],
        &intervals,
        &events,
        &HistoryFilter::default(),
    );

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record.id, 2, "новые матчи первыми");
    assert_eq!(rows[0].minutes_ms, 0, "у идущего матча нет длительности");

    assert_eq!(rows[1].tries, 2);
    assert_eq!(rows[1].tackles, 1);
    // 600_000 закрытых + (1_500_000 - 300_000) открытых
    assert_eq!(rows[1].minutes_ms, 600_000 + 1_200_000);
}

#[test]
fn history_limit_applies_after_filter() {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let matches: Vec<MatchRecord> = (1..=60)
        .map(|i| MatchRecord {
            id: i,
            opponent: if i % 2 == 0 { "Even".into() } else { "Odd".into() },
            status: MatchStatus::Final,
            half_length_minutes: 10,
            max_on_field: 8,
            started_at: Some(base + Duration::days(i as i64)),
            completed_at: None,
        })
        .collect();

    let all = aggregate_history(&matches, &BTreeMap::new(), &BTreeMap::new(), &HistoryFilter::default());
    assert_eq!(all.len(), 50);
    assert_eq!(all[0].record.id, 60);

    let odd = aggregate_history(
        &matches,
        &BTreeMap::new(),
        &BTreeMap::new(),
        &HistoryFilter::default().with_query("odd"),
    );
    assert_eq!(odd.len(), 30);
}
