//! Цели по игровому времени: справедливая доля и цель на полный матч.
//!
//! Всё считается целыми миллисекундами (с округлением вниз). Ранжирование
//! от этого не меняется — цель одна для всех игроков.

use serde::{Deserialize, Serialize};

use crate::domain::{MatchConfig, Millis};

const MS_PER_MINUTE: Millis = 60_000;

/// Доля каждого игрока, если бы поле делилось поровну с начала матча до `now_ms`.
///
/// `pool_size == 0` → 0.
pub fn fair_share_ms(now_ms: Millis, max_on_field: u32, pool_size: usize) -> Millis {
    if pool_size == 0 {
        return 0;
    }
    now_ms.saturating_mul(max_on_field as Millis) / pool_size as Millis
}

/// Справедливая доля на весь матч из двух таймов.
///
/// `pool_size == 0` → 0.
pub fn full_game_target_ms(half_length_minutes: u32, max_on_field: u32, pool_size: usize) -> Millis {
    if pool_size == 0 {
        return 0;
    }
    let full_game = half_length_minutes as Millis * 2 * MS_PER_MINUTE;
    full_game.saturating_mul(max_on_field as Millis) / pool_size as Millis
}

/// Сколько игрок переиграл относительно цели (может быть отрицательным).
pub fn surplus_ms(played_ms: Millis, target_ms: Millis) -> i64 {
    played_ms as i64 - target_ms as i64
}

/// Сколько игроку не хватает до цели (может быть отрицательным).
pub fn deficit_ms(played_ms: Millis, target_ms: Millis) -> i64 {
    target_ms as i64 - played_ms as i64
}

/// Снимок целей на текущий момент часов.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Targets {
    pub pool_size: usize,
    pub fair_share_ms: Millis,
    pub full_game_target_ms: Millis,
}

impl Targets {
    pub fn compute(config: &MatchConfig, now_ms: Millis, pool_size: usize) -> Self {
        Self {
            pool_size,
            fair_share_ms: fair_share_ms(now_ms, config.max_on_field, pool_size),
            full_game_target_ms: full_game_target_ms(
                config.half_length_minutes,
                config.max_on_field,
                pool_size,
            ),
        }
    }
}

/// Бейдж баланса игрока относительно справедливой доли.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BalanceBadge {
    /// Переиграл на порог и больше.
    Over,
    /// Недоиграл на порог и больше.
    Under,
    /// В пределах порога.
    Even,
}

impl BalanceBadge {
    pub fn classify(diff_ms: i64, threshold_ms: Millis) -> Self {
        let threshold = threshold_ms as i64;
        if diff_ms >= threshold {
            BalanceBadge::Over
        } else if diff_ms <= -threshold {
            BalanceBadge::Under
        } else {
            BalanceBadge::Even
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_thresholds_are_inclusive() {
        assert_eq!(BalanceBadge::classify(60_000, 60_000), BalanceBadge::Over);
        assert_eq!(BalanceBadge::classify(-60_000, 60_000), BalanceBadge::Under);
        assert_eq!(BalanceBadge::classify(59_999, 60_000), BalanceBadge::Even);
    }
}
