//! Прогон матча целиком: стартовый состав, часы, ротации и отметки.
//!
//! Используется консольной утилитой и нагрузочными тестами.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{EventKind, Millis, PlayerId};
use crate::engine::{EngineError, MatchSession, StoreWrite};
use crate::infra::persistence::{flush_writes, EventLog, IntervalStore};
use crate::infra::rng::RandomSource;

/// Параметры прогона.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationPlan {
    /// Шаг часов.
    pub tick_ms: Millis,
    /// Как часто тренер смотрит подсказку ротации.
    pub rotate_every_ms: Millis,
    /// Вероятность попытки на каждом шаге.
    pub try_chance: f64,
    /// Вероятность захвата на каждом шаге.
    pub tackle_chance: f64,
}

impl Default for SimulationPlan {
    fn default() -> Self {
        Self {
            tick_ms: 5_000,
            rotate_every_ms: 150_000,
            try_chance: 0.02,
            tackle_chance: 0.15,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationReport {
    pub batches: usize,
    pub substitutions: usize,
    pub tries: usize,
    pub tackles: usize,
    pub writes_applied: usize,
}

/// Сыграть матч от стартового свистка до финального.
///
/// Сессия должна быть в статусе Draft; стартовый состав берётся по
/// умолчанию. Все записи сразу уходят в `store`.
pub fn simulate_match<R, S>(
    session: &mut MatchSession,
    store: &mut S,
    rng: &mut R,
    plan: &SimulationPlan,
) -> Result<SimulationReport, EngineError>
where
    R: RandomSource,
    S: IntervalStore + EventLog,
{
    let match_id = session.match_id();
    let mut report = SimulationReport::default();
    let flush = |store: &mut S, writes: Vec<StoreWrite>, report: &mut SimulationReport| {
        report.writes_applied += flush_writes(store, match_id, &writes);
    };

    let starters = session.default_starters();
    let writes = session.start_match(&starters)?;
    flush(store, writes, &mut report);
    session.start_clock();

    let full_game = session.config().full_game_ms();
    let tick = plan.tick_ms.max(1);
    let mut next_rotation = plan.rotate_every_ms;

    while session.now_ms() < full_game {
        session.advance(tick);

        let on_field: Vec<PlayerId> = session.on_field().iter().map(|p| p.id.clone()).collect();
        for (kind, p) in [(EventKind::Try, plan.try_chance), (EventKind::Tackle, plan.tackle_chance)] {
            if !rng.chance(p) {
                continue;
            }
            if let Some(pid) = rng.pick(&on_field) {
                let writes = session.record_event(kind, Some(pid), None)?;
                flush(store, writes, &mut report);
                match kind {
                    EventKind::Try => report.tries += 1,
                    _ => report.tackles += 1,
                }
            }
        }

        if plan.rotate_every_ms > 0 && session.now_ms() >= next_rotation {
            next_rotation += plan.rotate_every_ms;
            if !session.suggest_rotation().is_empty() {
                let (batch, writes) = session.confirm_batch()?;
                report.batches += 1;
                report.substitutions += batch.pairs.len();
                flush(store, writes, &mut report);
            }
        }
    }

    let writes = session.end_match()?;
    flush(store, writes, &mut report);

    info!(
        match_id,
        batches = report.batches,
        tries = report.tries,
        tackles = report.tackles,
        "симуляция матча завершена"
    );
    Ok(report)
}
