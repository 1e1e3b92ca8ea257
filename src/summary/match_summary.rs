use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{EventKind, MatchEvent, Millis, PlayerId, PlayingInterval, Roster};
use crate::engine::{capped_minutes_by_player, minutes_for};

/// Счётчики отметок тренера.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventTally {
    pub tries: u32,
    pub tackles: u32,
    pub other: u32,
}

impl EventTally {
    fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::Try => self.tries += 1,
            EventKind::Tackle => self.tackles += 1,
            EventKind::Other => self.other += 1,
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tries == 0 && self.tackles == 0 && self.other == 0
    }
}

/// Строка игрока в итогах матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSummaryRow {
    pub player_id: PlayerId,
    pub name: String,
    pub shirt_number: Option<u32>,
    pub is_guest: bool,
    pub minutes_ms: Millis,
    pub tally: EventTally,
}

/// Итоги матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSummary {
    /// По убыванию сыгранного времени, при равенстве по id.
    pub rows: Vec<PlayerSummaryRow>,
    /// Сумма по строкам игроков.
    pub team_minutes_ms: Millis,
    pub team_tally: EventTally,
    /// Отметки без игрока или с игроком не из заявки.
    pub unattributed: EventTally,
}

/// Разложить отметки тренера по игрокам.
///
/// Возвращает счётчики по известным игрокам и счётчик "без игрока".
pub fn tally_events(
    roster: &Roster,
    events: &[MatchEvent],
) -> (BTreeMap<PlayerId, EventTally>, EventTally) {
    let mut by_player: BTreeMap<PlayerId, EventTally> = BTreeMap::new();
    let mut unattributed = EventTally::default();

    for event in events.iter().filter(|e| e.kind.is_quick_action()) {
        match &event.player_id {
            Some(pid) if roster.contains(pid) => {
                by_player.entry(pid.clone()).or_default().record(event.kind)
            }
            _ => unattributed.record(event.kind),
        }
    }

    (by_player, unattributed)
}

/// Собрать итоги матча.
///
/// `match_end` — граница для открытых интервалов (обычно отметка
/// `FULL_TIME`); без неё открытые интервалы дают ноль.
pub fn build_summary(
    roster: &Roster,
    intervals: &[PlayingInterval],
    events: &[MatchEvent],
    match_end: Option<Millis>,
) -> MatchSummary {
    let minutes = capped_minutes_by_player(intervals, match_end);
    let (tallies, unattributed) = tally_events(roster, events);

    let mut rows: Vec<PlayerSummaryRow> = roster
        .players()
        .iter()
        .map(|p| PlayerSummaryRow {
            player_id: p.id.clone(),
            name: p.display_name(),
            shirt_number: p.shirt_number,
            is_guest: p.is_guest,
            minutes_ms: minutes_for(&minutes, &p.id),
            tally: tallies.get(&p.id).copied().unwrap_or_default(),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.minutes_ms
            .cmp(&a.minutes_ms)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });

    let mut team_tally = EventTally::default();
    let mut team_minutes_ms: Millis = 0;
    for row in &rows {
        team_minutes_ms += row.minutes_ms;
        team_tally.tries += row.tally.tries;
        team_tally.tackles += row.tally.tackles;
        team_tally.other += row.tally.other;
    }

    MatchSummary {
        rows,
        team_minutes_ms,
        team_tally,
        unattributed,
    }
}

/// Граница для открытых интервалов: отметка последнего `FULL_TIME`.
pub fn full_time_at(events: &[MatchEvent]) -> Option<Millis> {
    events
        .iter()
        .rev()
        .find(|e| e.kind == EventKind::FullTime)
        .map(|e| e.at_ms)
}
