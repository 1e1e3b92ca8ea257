//! История матчей команды: фильтр, агрегаты, повтор и переоткрытие.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{EventKind, MatchEvent, MatchId, MatchRecord, MatchStatus, Millis, PlayingInterval};

/// Сколько матчей показывает история.
pub const HISTORY_LIMIT: usize = 50;

/// Фильтр списка матчей.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryFilter {
    /// `None` — все статусы.
    #[serde(default)]
    pub status: Option<MatchStatus>,
    /// Подстрока имени соперника, без учёта регистра.
    #[serde(default)]
    pub opponent_query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    HISTORY_LIMIT
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            status: None,
            opponent_query: String::new(),
            limit: HISTORY_LIMIT,
        }
    }
}

impl HistoryFilter {
    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.opponent_query = query.into();
        self
    }

    pub fn matches(&self, record: &MatchRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        let query = self.opponent_query.trim().to_lowercase();
        query.is_empty() || record.opponent.to_lowercase().contains(&query)
    }
}

/// Строка истории: матч и его агрегаты.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRow {
    pub record: MatchRecord,
    pub tries: u32,
    pub tackles: u32,
    /// Суммарное время всех игроков.
    pub minutes_ms: Millis,
}

/// Собрать историю матчей.
///
/// Открытые интервалы обрезаются по длительности матча
/// (`completed_at - started_at`); если её нет, считаются нулевыми.
/// Порядок: по `started_at` от новых к старым, матчи без отметки в конце.
pub fn aggregate_history(
    matches: &[MatchRecord],
    intervals: &BTreeMap<MatchId, Vec<PlayingInterval>>,
    events: &BTreeMap<MatchId, Vec<MatchEvent>>,
    filter: &HistoryFilter,
) -> Vec<HistoryRow> {
    let mut selected: Vec<&MatchRecord> = matches.iter().filter(|m| filter.matches(m)).collect();
    selected.sort_by(|a, b| newest_first(a, b));
    selected.truncate(filter.limit);

    let rows: Vec<HistoryRow> = selected
        .into_iter()
        .map(|record| {
            let cap = record.match_length_ms();
            let minutes_ms: Millis = intervals
                .get(&record.id)
                .map(|list| list.iter().map(|i| i.capped_duration(cap)).sum())
                .unwrap_or(0);

            let (mut tries, mut tackles) = (0, 0);
            for event in events.get(&record.id).into_iter().flatten() {
                match event.kind {
                    EventKind::Try => tries += 1,
                    EventKind::Tackle => tackles += 1,
                    _ => {}
                }
            }

            HistoryRow {
                record: record.clone(),
                tries,
                tackles,
                minutes_ms,
            }
        })
        .collect();

    debug!(total = matches.len(), shown = rows.len(), "история собрана");
    rows
}

fn newest_first(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    match (a.started_at, b.started_at) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    }
}

/// Новый черновик с тем же соперником и форматом.
pub fn duplicate_as_draft(record: &MatchRecord, new_id: MatchId) -> MatchRecord {
    MatchRecord {
        id: new_id,
        opponent: record.opponent.clone(),
        status: MatchStatus::Draft,
        half_length_minutes: record.half_length_minutes,
        max_on_field: record.max_on_field,
        started_at: None,
        completed_at: None,
    }
}

/// Вернуть матч в черновик для правки. Отметки времени не трогаются.
pub fn reopen(record: &mut MatchRecord) {
    record.status = MatchStatus::Draft;
}
