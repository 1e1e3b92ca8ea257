// src/time_ctrl/mod.rs
//! Контроль времени матча.
//!
//! Здесь собираем:
//! - часы матча (`MatchClock`);
//! - фазу матча относительно перерыва (`MatchPhase`);
//! - форматирование времени для экрана.

pub mod clock;
pub mod format;

pub use clock::MatchClock;
pub use format::{fmt_clock, fmt_minutes, fmt_signed};

use serde::{Deserialize, Serialize};

use crate::domain::{MatchConfig, Millis};

/// Фаза матча по часам.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchPhase {
    FirstHalf,
    SecondHalf,
    /// Часы ушли за расчётную длительность двух таймов.
    Overtime,
}

impl MatchPhase {
    pub fn at(now_ms: Millis, config: &MatchConfig) -> Self {
        if now_ms < config.halftime_ms() {
            MatchPhase::FirstHalf
        } else if now_ms < config.full_game_ms() {
            MatchPhase::SecondHalf
        } else {
            MatchPhase::Overtime
        }
    }

    /// До перерыва действуют ограничения "закреплён"/"придержан".
    pub fn is_before_halftime(self) -> bool {
        self == MatchPhase::FirstHalf
    }
}
