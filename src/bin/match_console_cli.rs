// src/bin/match_console_cli.rs
//
// Прогон одного матча без экрана: состав-заглушка, часы, ротации по
// подсказке, случайные попытки/захваты. В конце печатаем итоги и историю.
//
// Запуск: match_console_cli [config.json] [seed]

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use knights_rotation::domain::{MatchConfig, MatchRecord, MatchStatus, Player, Roster};
use knights_rotation::engine::{reconstruct_intervals, MatchSession};
use knights_rotation::infra::{
    simulate_match, DeterministicRng, EventLog, IdGenerator, InMemoryMatchStore, IntervalStore,
    MatchRecordStore, RefreshReconciler, SimulationPlan,
};
use knights_rotation::summary::{aggregate_history, build_summary, full_time_at, HistoryFilter};
use knights_rotation::time_ctrl::{fmt_clock, fmt_minutes};

const SQUAD_SIZE: usize = 14;
const DEFAULT_SEED: u64 = 7;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knights_rotation=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let config = match load_config(args.next()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Ошибка конфигурации: {}", err);
            std::process::exit(2);
        }
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SEED);

    println!("=== MIGHTY KNIGHTS: ПРОГОН МАТЧА ===\n");
    println!(
        "Формат: {} на поле, тайм {} мин, seed={}",
        config.max_on_field, config.half_length_minutes, seed
    );

    let ids = IdGenerator::new();
    let mut store = InMemoryMatchStore::new();

    let mut roster = Roster::placeholder(SQUAD_SIZE);
    roster.merge_guests([Player::new("g1", "Guest One")]);

    let match_id = ids.next_match_id();
    let started_at = Utc::now();
    let mut record = MatchRecord {
        id: match_id,
        opponent: "Harlequins".to_string(),
        status: MatchStatus::Live,
        half_length_minutes: config.half_length_minutes,
        max_on_field: config.max_on_field,
        started_at: Some(started_at),
        completed_at: None,
    };
    store.save_match(&record);

    let mut session = MatchSession::new(match_id, config.clone(), roster.clone());
    let mut rng = DeterministicRng::from_seed(seed);

    let report = match simulate_match(&mut session, &mut store, &mut rng, &SimulationPlan::default()) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("Ошибка в ходе матча: {}", err);
            std::process::exit(1);
        }
    };

    record.status = MatchStatus::Final;
    record.completed_at = Some(started_at + Duration::milliseconds(session.now_ms() as i64));
    store.save_match(&record);

    println!(
        "Матч завершён на {}: пакетов замен {}, замен {}, записей в хранилище {}",
        fmt_clock(session.now_ms()),
        report.batches,
        report.substitutions,
        report.writes_applied
    );

    // Перечитываем матч из хранилища, как это делает второе устройство.
    let reconciler = RefreshReconciler::from_config(&config);
    let now = session.now_ms();
    match reconciler.refresh_session(&mut session, &store, now) {
        Ok(applied) => println!("Обновление из хранилища применено: {}", applied),
        Err(err) => eprintln!("Ошибка обновления: {}", err),
    }

    // Сверка: интервалы из журнала должны совпасть с хранилищем.
    let events = store.load_events(match_id);
    let stored = store.load_intervals(match_id);
    match reconstruct_intervals(&events) {
        Ok(book) => {
            let mut rebuilt = book.intervals().to_vec();
            let mut expected = stored.clone();
            rebuilt.sort_by(|a, b| (a.start_ms, &a.player_id).cmp(&(b.start_ms, &b.player_id)));
            expected.sort_by(|a, b| (a.start_ms, &a.player_id).cmp(&(b.start_ms, &b.player_id)));
            let ok = rebuilt == expected;
            println!("Сверка журнала с интервалами: {}", if ok { "OK" } else { "РАСХОЖДЕНИЕ" });
        }
        Err(err) => eprintln!("Журнал не читается: {}", err),
    }

    let summary = build_summary(&roster, &stored, &events, full_time_at(&events));

    println!();
    println!("=========== ИТОГИ МАТЧА ===========");
    for row in &summary.rows {
        let shirt = row.shirt_number.map(|n| format!("#{}", n)).unwrap_or_default();
        println!(
            "{:<14} {:>4} ⏱ {}  попытки {}  захваты {}  прочее {}",
            row.name,
            shirt,
            fmt_clock(row.minutes_ms),
            row.tally.tries,
            row.tally.tackles,
            row.tally.other
        );
    }
    println!("-----------------------------------");
    println!(
        "Команда: {} | попытки {} | захваты {} | прочее {}",
        fmt_minutes(summary.team_minutes_ms),
        summary.team_tally.tries,
        summary.team_tally.tackles,
        summary.team_tally.other
    );
    if !summary.unattributed.is_empty() {
        println!(
            "Без игрока: попытки {} | захваты {} | прочее {}",
            summary.unattributed.tries, summary.unattributed.tackles, summary.unattributed.other
        );
    }
    println!("===================================");

    let mut intervals = BTreeMap::new();
    let mut all_events = BTreeMap::new();
    let matches = store.list_matches();
    for m in &matches {
        intervals.insert(m.id, store.load_intervals(m.id));
        all_events.insert(m.id, store.load_events(m.id));
    }

    println!("\n=========== ИСТОРИЯ ===========");
    for row in aggregate_history(&matches, &intervals, &all_events, &HistoryFilter::default()) {
        println!(
            "#{} {} • {}-a-side • {}′ тайм • {:?} | попытки {} | захваты {} | {}",
            row.record.id,
            row.record.opponent,
            row.record.max_on_field,
            row.record.half_length_minutes,
            row.record.status,
            row.tries,
            row.tackles,
            fmt_minutes(row.minutes_ms)
        );
    }
}

fn load_config(path: Option<String>) -> Result<MatchConfig, knights_rotation::domain::ConfigError> {
    let base = match path {
        Some(p) => MatchConfig::from_path(p)?,
        None => MatchConfig::standard(),
    };
    base.with_env_overrides()
}
