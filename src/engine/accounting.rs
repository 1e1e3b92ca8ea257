//! Учёт интервалов на поле и подсчёт сыгранного времени.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Millis, PlayerId, PlayingInterval};
use crate::engine::EngineError;

/// Сыгранное время по игрокам на момент `now_ms`.
///
/// Открытый интервал считается идущим до `now_ms`. Чистая функция:
/// одинаковые входы дают одинаковый результат.
pub fn minutes_by_player(intervals: &[PlayingInterval], now_ms: Millis) -> BTreeMap<PlayerId, Millis> {
    let mut map = BTreeMap::new();
    for interval in intervals {
        *map.entry(interval.player_id.clone()).or_insert(0) += interval.duration_at(now_ms);
    }
    map
}

/// То же, но открытые интервалы обрезаются по `cap` (без `cap` — нулевые).
/// Используется для итогов матча и истории, где живых часов нет.
pub fn capped_minutes_by_player(
    intervals: &[PlayingInterval],
    cap: Option<Millis>,
) -> BTreeMap<PlayerId, Millis> {
    let mut map = BTreeMap::new();
    for interval in intervals {
        *map.entry(interval.player_id.clone()).or_insert(0) += interval.capped_duration(cap);
    }
    map
}

/// Время игрока из карты; игроки без интервалов — 0.
pub fn minutes_for(minutes: &BTreeMap<PlayerId, Millis>, player_id: &PlayerId) -> Millis {
    minutes.get(player_id).copied().unwrap_or(0)
}

/// Игрок на поле, если у него есть открытый интервал.
pub fn is_on_field(intervals: &[PlayingInterval], player_id: &PlayerId) -> bool {
    intervals
        .iter()
        .any(|i| &i.player_id == player_id && i.is_open())
}

/// Все игроки с открытым интервалом.
pub fn on_field_ids(intervals: &[PlayingInterval]) -> BTreeSet<PlayerId> {
    intervals
        .iter()
        .filter(|i| i.is_open())
        .map(|i| i.player_id.clone())
        .collect()
}

/// Книга интервалов одного матча.
///
/// Единственное место, где интервалы меняются. Инвариант: у игрока не
/// больше одного открытого интервала; при нарушении операция отклоняется,
/// список не меняется.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntervalBook {
    intervals: Vec<PlayingInterval>,
}

impl IntervalBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Собрать книгу из готового списка (например, из хранилища).
    pub fn from_intervals(intervals: Vec<PlayingInterval>) -> Result<Self, EngineError> {
        check_single_open(&intervals)?;
        Ok(Self { intervals })
    }

    pub fn intervals(&self) -> &[PlayingInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_on_field(&self, player_id: &PlayerId) -> bool {
        self.open_index(player_id).is_some()
    }

    pub fn on_field_ids(&self) -> BTreeSet<PlayerId> {
        on_field_ids(&self.intervals)
    }

    pub fn on_field_count(&self) -> usize {
        self.intervals.iter().filter(|i| i.is_open()).count()
    }

    pub fn minutes(&self, now_ms: Millis) -> BTreeMap<PlayerId, Millis> {
        minutes_by_player(&self.intervals, now_ms)
    }

    fn open_index(&self, player_id: &PlayerId) -> Option<usize> {
        self.intervals
            .iter()
            .position(|i| &i.player_id == player_id && i.is_open())
    }

    /// Игрок выходит на поле в момент `at_ms`.
    pub fn open_interval(&mut self, player_id: &PlayerId, at_ms: Millis) -> Result<(), EngineError> {
        if self.is_on_field(player_id) {
            warn!(player = %player_id, at_ms, "повторное открытие интервала отклонено");
            return Err(EngineError::AlreadyOnField(player_id.clone()));
        }
        self.intervals
            .push(PlayingInterval::open(player_id.clone(), at_ms));
        Ok(())
    }

    /// Игрок уходит с поля в момент `at_ms`.
    ///
    /// Если часы ушли назад (`at_ms` раньше начала), конец прижимается к
    /// началу — длительность 0. Возвращает закрытый интервал.
    pub fn close_interval(
        &mut self,
        player_id: &PlayerId,
        at_ms: Millis,
    ) -> Result<PlayingInterval, EngineError> {
        let idx = self
            .open_index(player_id)
            .ok_or_else(|| EngineError::NotOnField(player_id.clone()))?;

        let interval = &mut self.intervals[idx];
        let end_ms = if at_ms < interval.start_ms {
            warn!(
                player = %player_id,
                start_ms = interval.start_ms,
                at_ms,
                "часы ушли назад, длительность прижата к нулю"
            );
            interval.start_ms
        } else {
            at_ms
        };
        interval.end_ms = Some(end_ms);
        Ok(interval.clone())
    }

    /// Финальный свисток: закрыть все открытые интервалы.
    /// Возвращает закрытые интервалы в порядке книги.
    pub fn close_all(&mut self, at_ms: Millis) -> Vec<PlayingInterval> {
        let open: Vec<PlayerId> = self
            .intervals
            .iter()
            .filter(|i| i.is_open())
            .map(|i| i.player_id.clone())
            .collect();

        open.iter()
            .filter_map(|pid| self.close_interval(pid, at_ms).ok())
            .collect()
    }

    /// Сброс матча — единственный случай удаления интервалов.
    pub fn clear(&mut self) {
        self.intervals.clear();
    }
}

fn check_single_open(intervals: &[PlayingInterval]) -> Result<(), EngineError> {
    let mut open = BTreeSet::new();
    for interval in intervals.iter().filter(|i| i.is_open()) {
        if !open.insert(&interval.player_id) {
            return Err(EngineError::AlreadyOnField(interval.player_id.clone()));
        }
    }
    Ok(())
}
