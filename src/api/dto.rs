use serde::{Deserialize, Serialize};

use crate::domain::{MatchId, MatchStatus, Millis, PlayerId};
use crate::engine::BalanceBadge;
use crate::time_ctrl::MatchPhase;

/// DTO строки игрока на экране матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRowDto {
    pub player_id: PlayerId,
    pub display_name: String,
    pub shirt_number: Option<u32>,
    pub is_guest: bool,
    pub available: bool,
    pub on_field: bool,
    pub minutes_ms: Millis,
    /// `mm:ss`.
    pub minutes_text: String,
    /// Сыграно минус справедливая доля на текущий момент.
    pub diff_ms: i64,
    /// `+mm:ss` / `-mm:ss`.
    pub diff_text: String,
    pub badge: BalanceBadge,
    pub locked_until_halftime: bool,
    pub held_for_halftime: bool,
    /// Отмечен в выборе (уходит или выходит, в зависимости от списка).
    pub selected: bool,
}

/// DTO экрана матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleViewDto {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub clock_ms: Millis,
    pub clock_text: String,
    pub running: bool,
    pub phase: MatchPhase,
    pub half_length_minutes: u32,
    pub max_on_field: u32,
    pub pool_size: usize,
    pub fair_share_ms: Millis,
    pub full_game_target_ms: Millis,
    /// Игроки на поле в порядке заявки.
    pub on_field: Vec<PlayerRowDto>,
    /// Все остальные в порядке заявки.
    pub bench: Vec<PlayerRowDto>,
    /// Кнопка подтверждения пакета активна.
    pub can_confirm: bool,
    pub can_undo: bool,
}
