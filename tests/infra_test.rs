// tests/infra_test.rs

use knights_rotation::{
    domain::{EventKind, MatchConfig, MatchEvent, MatchRecord, MatchStatus, PlayerId, Roster},
    engine::{reconstruct_intervals, MatchSession, StoreWrite},
    infra::{
        ids::IdGenerator,
        persistence::{flush_writes, EventLog, InMemoryMatchStore, IntervalStore, MatchRecordStore},
        reconcile::{RefreshDecision, RefreshReconciler},
        rng::{DeterministicRng, RandomSource, SystemRng},
        simulate::{simulate_match, SimulationPlan},
    },
};

//
// ---------- helpers ----------
//

fn pid(s: &str) -> PlayerId {
    PlayerId::from(s)
}

fn live_session(match_id: u64) -> (MatchSession, InMemoryMatchStore) {
    let mut store = InMemoryMatchStore::new();
    let mut s = MatchSession::new(match_id, MatchConfig::standard(), Roster::placeholder(12));
    let starters = s.default_starters();
    let writes = s.start_match(&starters).unwrap();
    flush_writes(&mut store, match_id, &writes);
    s.start_clock();
    (s, store)
}

//
// ---------- ids.rs tests ----------
//

#[test]
fn id_generator_produces_sequential_ids() {
    let gen = IdGenerator::new();

    let m1 = gen.next_match_id();
    let m2 = gen.next_match_id();
    assert_eq!(m1, 1);
    assert_eq!(m2, m1 + 1);

    let gen2 = IdGenerator::starting_at(100);
    assert_eq!(gen2.next_match_id(), 100);
}

//
// ---------- persistence.rs tests ----------
//

#[test]
fn store_open_and_close_rows() {
    let mut store = InMemoryMatchStore::new();
    store.insert_open(1, &pid("b"), 5_000);
    store.insert_open(1, &pid("a"), 0);

    assert!(store.close_open(1, &pid("a"), 60_000));
    assert!(!store.close_open(1, &pid("a"), 70_000), "открытой строки уже нет");
    assert!(!store.close_open(2, &pid("b"), 70_000), "другой матч");

    let rows = store.load_intervals(1);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].player_id, pid("a"), "строки по start_ms");
    assert_eq!(rows[0].end_ms, Some(60_000));
    assert!(rows[1].is_open());
}

#[test]
fn flush_writes_mirrors_session() {
    let (mut s, mut store) = live_session(4);
    s.advance(200_000);
    s.suggest_rotation();
    let (_, writes) = s.confirm_batch().unwrap();

    let applied = flush_writes(&mut store, 4, &writes);

    assert_eq!(applied, writes.len());
    let mut stored = store.load_intervals(4);
    let mut local = s.intervals().to_vec();
    stored.sort_by(|a, b| (a.start_ms, &a.player_id).cmp(&(b.start_ms, &b.player_id)));
    local.sort_by(|a, b| (a.start_ms, &a.player_id).cmp(&(b.start_ms, &b.player_id)));
    assert_eq!(stored, local);
    assert_eq!(store.load_events(4), s.events());
}

#[test]
fn flush_skips_close_without_open_row() {
    let mut store = InMemoryMatchStore::new();
    let writes = vec![
        StoreWrite::CloseInterval {
            player_id: pid("a"),
            end_ms: 1_000,
        },
        StoreWrite::AppendEvent(MatchEvent::new(EventKind::Other, 1_000)),
    ];
    assert_eq!(flush_writes(&mut store, 1, &writes), 1);
}

#[test]
fn flush_reset_deletes_match_rows() {
    let (mut s, mut store) = live_session(5);
    store.insert_open(6, &pid("x"), 0);

    let writes = s.reset();
    flush_writes(&mut store, 5, &writes);

    assert!(store.load_intervals(5).is_empty());
    assert!(store.load_events(5).is_empty());
    assert_eq!(store.load_intervals(6).len(), 1, "чужой матч не трогаем");
}

#[test]
fn match_records_round_trip() {
    let mut store = InMemoryMatchStore::new();
    let record = MatchRecord {
        id: 3,
        opponent: "Tigers".into(),
        status: MatchStatus::Draft,
        half_length_minutes: 12,
        max_on_field: 7,
        started_at: None,
        completed_at: None,
    };
    store.save_match(&record);

    assert_eq!(store.load_match(3), Some(record));
    assert_eq!(store.list_matches().len(), 1);
    assert_eq!(store.load_match(4), None);
}

//
// ---------- reconcile.rs tests ----------
//

#[test]
fn refresh_inside_debounce_window_is_discarded() {
    let (mut s, mut store) = live_session(7);
    let mut reconciler = RefreshReconciler::from_config(s.config());

    // чужое устройство записало замену прямо в хранилище
    store.close_open(7, &pid("p1"), 10_000);
    store.insert_open(7, &pid("p9"), 10_000);

    reconciler.note_local_write(1_000);
    assert_eq!(reconciler.offer_refresh(1_500), RefreshDecision::Discard);
    assert!(!reconciler.refresh_session(&mut s, &store, 1_500).unwrap());
    assert!(s.is_on_field(&pid("p1")));

    assert!(reconciler.refresh_session(&mut s, &store, 2_000).unwrap());
    assert!(!s.is_on_field(&pid("p1")));
    assert!(s.is_on_field(&pid("p9")));
}

//
// ---------- rng.rs tests ----------
//

#[test]
fn deterministic_rng_repeats_for_same_seed() {
    let mut a = DeterministicRng::from_seed(42);
    let mut b = DeterministicRng::from_seed(42);
    let items = [1, 2, 3, 4, 5];

    for _ in 0..50 {
        assert_eq!(a.range(0, 1_000), b.range(0, 1_000));
        assert_eq!(a.pick(&items), b.pick(&items));
        assert_eq!(a.chance(0.3), b.chance(0.3));
    }
}

#[test]
fn rng_edge_cases() {
    let mut rng = SystemRng;
    let empty: [u8; 0] = [];
    assert_eq!(rng.pick(&empty), None);
    assert_eq!(rng.range(5, 5), 5);
    assert!(!rng.chance(0.0));
    assert!(rng.chance(1.0));
}

//
// ---------- simulate.rs tests ----------
//

#[test]
fn simulation_plays_full_match_and_is_reproducible() {
    let run = |seed: u64| {
        let mut store = InMemoryMatchStore::new();
        let mut s = MatchSession::new(1, MatchConfig::standard(), Roster::placeholder(14));
        let mut rng = DeterministicRng::from_seed(seed);
        let report = simulate_match(&mut s, &mut store, &mut rng, &SimulationPlan::default()).unwrap();
        (s, store, report)
    };

    let (s, store, report) = run(11);
    let (_, store_again, report_again) = run(11);

    assert_eq!(report, report_again);
    assert_eq!(store.load_events(1), store_again.load_events(1));

    assert_eq!(s.status(), MatchStatus::Final);
    assert!(report.batches > 0);
    assert!(s.on_field().is_empty());

    let replayed = reconstruct_intervals(&store.load_events(1)).unwrap();
    assert_eq!(replayed.len(), store.load_intervals(1).len());
}
