use serde::{Deserialize, Serialize};

use crate::domain::{MatchEvent, Player};
use crate::engine::{minutes_for, surplus_ms, BalanceBadge, MatchSession, Targets};
use crate::summary::{build_summary, full_time_at, MatchSummary};
use crate::time_ctrl::{fmt_clock, fmt_signed};

use super::dto::{ConsoleViewDto, PlayerRowDto};

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsoleQuery {
    /// Экран матча целиком.
    GetConsole,

    /// Цели по времени на текущий момент.
    GetTargets,

    /// Журнал событий.
    GetEvents,

    /// Итоги матча (открытые интервалы обрезаются по FULL_TIME или часам).
    GetSummary,
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryResponse {
    Console(ConsoleViewDto),
    Targets(Targets),
    Events(Vec<MatchEvent>),
    Summary(MatchSummary),
}

pub fn handle_query(session: &MatchSession, query: &ConsoleQuery) -> QueryResponse {
    match query {
        ConsoleQuery::GetConsole => QueryResponse::Console(build_console_view(session)),
        ConsoleQuery::GetTargets => QueryResponse::Targets(session.targets()),
        ConsoleQuery::GetEvents => QueryResponse::Events(session.events().to_vec()),
        ConsoleQuery::GetSummary => QueryResponse::Summary(build_session_summary(session)),
    }
}

/// Итоги по данным сессии. Для идущего матча граница — текущие часы.
pub fn build_session_summary(session: &MatchSession) -> MatchSummary {
    let end = full_time_at(session.events()).unwrap_or_else(|| session.now_ms());
    build_summary(session.roster(), session.intervals(), session.events(), Some(end))
}

/// Сформировать DTO экрана матча.
pub fn build_console_view(session: &MatchSession) -> ConsoleViewDto {
    let targets = session.targets();
    let minutes = session.minutes();
    let threshold = session.config().balance_threshold_ms;

    let row = |player: &Player, selected: bool| {
        let played = minutes_for(&minutes, &player.id);
        let diff = surplus_ms(played, targets.fair_share_ms);
        PlayerRowDto {
            player_id: player.id.clone(),
            display_name: player.display_name(),
            shirt_number: player.shirt_number,
            is_guest: player.is_guest,
            available: session.availability().contains(&player.id),
            on_field: session.is_on_field(&player.id),
            minutes_ms: played,
            minutes_text: fmt_clock(played),
            diff_ms: diff,
            diff_text: fmt_signed(diff),
            badge: BalanceBadge::classify(diff, threshold),
            locked_until_halftime: session.flags().is_locked_until_halftime(&player.id),
            held_for_halftime: session.flags().is_held_for_halftime(&player.id),
            selected,
        }
    };

    let selection = session.selection();
    let on_field = session
        .on_field()
        .into_iter()
        .map(|p| row(p, selection.off.contains(&p.id)))
        .collect();
    let bench = session
        .bench()
        .into_iter()
        .map(|p| row(p, selection.on.contains(&p.id)))
        .collect();

    let config = session.config();
    ConsoleViewDto {
        match_id: session.match_id(),
        status: session.status(),
        clock_ms: session.now_ms(),
        clock_text: fmt_clock(session.now_ms()),
        running: session.clock().is_running(),
        phase: session.phase(),
        half_length_minutes: config.half_length_minutes,
        max_on_field: config.max_on_field,
        pool_size: targets.pool_size,
        fair_share_ms: targets.fair_share_ms,
        full_game_target_ms: targets.full_game_target_ms,
        on_field,
        bench,
        can_confirm: selection.is_confirmable(),
        can_undo: session.can_undo(),
    }
}
