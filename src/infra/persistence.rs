use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::{MatchEvent, MatchId, MatchRecord, Millis, PlayerId, PlayingInterval};
use crate::engine::StoreWrite;

/// Хранилище интервалов на поле.
///
/// Ключ строки: `(match_id, player_id, start_ms)`; открытая строка имеет
/// пустой `end_ms`.
pub trait IntervalStore {
    /// Все интервалы матча в порядке `start_ms`.
    fn load_intervals(&self, match_id: MatchId) -> Vec<PlayingInterval>;

    fn insert_open(&mut self, match_id: MatchId, player_id: &PlayerId, start_ms: Millis);

    /// Проставить `end_ms` единственной открытой строке игрока.
    /// false, если открытой строки нет.
    fn close_open(&mut self, match_id: MatchId, player_id: &PlayerId, end_ms: Millis) -> bool;

    fn delete_intervals(&mut self, match_id: MatchId);
}

/// Журнал событий матча (только дозапись).
pub trait EventLog {
    fn append_event(&mut self, match_id: MatchId, event: MatchEvent);

    /// События матча в порядке записи.
    fn load_events(&self, match_id: MatchId) -> Vec<MatchEvent>;

    fn delete_events(&mut self, match_id: MatchId);
}

/// Строки матчей для истории.
pub trait MatchRecordStore {
    fn load_match(&self, id: MatchId) -> Option<MatchRecord>;

    fn save_match(&mut self, record: &MatchRecord);

    fn list_matches(&self) -> Vec<MatchRecord>;
}

/// Простая in-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    intervals: HashMap<MatchId, Vec<PlayingInterval>>,
    events: HashMap<MatchId, Vec<MatchEvent>>,
    matches: HashMap<MatchId, MatchRecord>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntervalStore for InMemoryMatchStore {
    fn load_intervals(&self, match_id: MatchId) -> Vec<PlayingInterval> {
        let mut rows = self.intervals.get(&match_id).cloned().unwrap_or_default();
        rows.sort_by_key(|i| i.start_ms);
        rows
    }

    fn insert_open(&mut self, match_id: MatchId, player_id: &PlayerId, start_ms: Millis) {
        self.intervals
            .entry(match_id)
            .or_default()
            .push(PlayingInterval::open(player_id.clone(), start_ms));
    }

    fn close_open(&mut self, match_id: MatchId, player_id: &PlayerId, end_ms: Millis) -> bool {
        let open = self
            .intervals
            .get_mut(&match_id)
            .and_then(|rows| rows.iter_mut().find(|i| &i.player_id == player_id && i.is_open()));

        match open {
            Some(row) => {
                row.end_ms = Some(end_ms.max(row.start_ms));
                true
            }
            None => false,
        }
    }

    fn delete_intervals(&mut self, match_id: MatchId) {
        self.intervals.remove(&match_id);
    }
}

impl EventLog for InMemoryMatchStore {
    fn append_event(&mut self, match_id: MatchId, event: MatchEvent) {
        self.events.entry(match_id).or_default().push(event);
    }

    fn load_events(&self, match_id: MatchId) -> Vec<MatchEvent> {
        self.events.get(&match_id).cloned().unwrap_or_default()
    }

    fn delete_events(&mut self, match_id: MatchId) {
        self.events.remove(&match_id);
    }
}

impl MatchRecordStore for InMemoryMatchStore {
    fn load_match(&self, id: MatchId) -> Option<MatchRecord> {
        self.matches.get(&id).cloned()
    }

    fn save_match(&mut self, record: &MatchRecord) {
        self.matches.insert(record.id, record.clone());
    }

    fn list_matches(&self) -> Vec<MatchRecord> {
        self.matches.values().cloned().collect()
    }
}

/// Отправить пакет записей сессии в хранилище.
///
/// Возвращает число применённых записей. Закрытие без открытой строки
/// пропускается с предупреждением.
pub fn flush_writes<S>(store: &mut S, match_id: MatchId, writes: &[StoreWrite]) -> usize
where
    S: IntervalStore + EventLog,
{
    let mut applied = 0;
    for write in writes {
        match write {
            StoreWrite::OpenInterval { player_id, start_ms } => {
                store.insert_open(match_id, player_id, *start_ms);
                applied += 1;
            }
            StoreWrite::CloseInterval { player_id, end_ms } => {
                if store.close_open(match_id, player_id, *end_ms) {
                    applied += 1;
                } else {
                    warn!(match_id, player = %player_id, end_ms, "нет открытого интервала для закрытия");
                }
            }
            StoreWrite::AppendEvent(event) => {
                store.append_event(match_id, event.clone());
                applied += 1;
            }
            StoreWrite::ResetMatch => {
                store.delete_intervals(match_id);
                store.delete_events(match_id);
                applied += 1;
            }
        }
    }
    debug!(match_id, total = writes.len(), applied, "записи отправлены в хранилище");
    applied
}
