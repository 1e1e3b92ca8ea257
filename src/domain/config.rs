//! Конфигурация матча: длина тайма, сколько игроков на поле и т.д.
//!
//! Только "правила", без состояния и без привязки к конкретному матчу.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Millis;

const MS_PER_MINUTE: Millis = 60_000;

/// Ошибки загрузки/проверки конфигурации.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Некорректная длина тайма: {0} мин")]
    InvalidHalfLength(u32),

    #[error("Некорректное количество игроков на поле: {0}")]
    InvalidMaxOnField(u32),

    #[error("Переменная окружения {name} содержит некорректное значение {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Не удалось прочитать конфиг: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось разобрать конфиг: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Правила одного матча.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    /// Длина одного тайма в минутах (матч = два равных тайма).
    pub half_length_minutes: u32,
    /// Сколько игроков команды одновременно на поле.
    pub max_on_field: u32,
    /// Участвуют ли гости в ротации и в расчёте справедливой доли.
    #[serde(default)]
    pub guests_in_rotation: bool,
    /// Порог отклонения от справедливой доли для бейджа "перебор/недобор".
    #[serde(default = "default_balance_threshold_ms")]
    pub balance_threshold_ms: Millis,
    /// Окно после локальной записи, в котором входящие обновления игнорируются.
    #[serde(default = "default_refresh_debounce_ms")]
    pub refresh_debounce_ms: Millis,
}

const fn default_balance_threshold_ms() -> Millis {
    60_000
}

const fn default_refresh_debounce_ms() -> Millis {
    750
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl MatchConfig {
    /// Строгий конструктор; остальные параметры — стандартные.
    pub const fn new(half_length_minutes: u32, max_on_field: u32) -> Self {
        Self {
            half_length_minutes,
            max_on_field,
            guests_in_rotation: false,
            balance_threshold_ms: default_balance_threshold_ms(),
            refresh_debounce_ms: default_refresh_debounce_ms(),
        }
    }

    /// Стандартный профиль: два тайма по 10 минут, 8 на поле.
    pub const fn standard() -> Self {
        Self::new(10, 8)
    }

    /// Момент перерыва на часах матча.
    pub const fn halftime_ms(&self) -> Millis {
        self.half_length_minutes as Millis * MS_PER_MINUTE
    }

    /// Полная длительность матча (два тайма).
    pub const fn full_game_ms(&self) -> Millis {
        self.halftime_ms() * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.half_length_minutes == 0 || self.half_length_minutes > 60 {
            return Err(ConfigError::InvalidHalfLength(self.half_length_minutes));
        }
        if self.max_on_field == 0 || self.max_on_field > 15 {
            return Err(ConfigError::InvalidMaxOnField(self.max_on_field));
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Переопределить параметры из окружения.
    ///
    /// | Env Var                   | Поле                  |
    /// |---------------------------|-----------------------|
    /// | `KNIGHTS_HALF_LENGTH_MIN` | `half_length_minutes` |
    /// | `KNIGHTS_MAX_ON_FIELD`    | `max_on_field`        |
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(v) = read_env_u32("KNIGHTS_HALF_LENGTH_MIN")? {
            self.half_length_minutes = v;
        }
        if let Some(v) = read_env_u32("KNIGHTS_MAX_ON_FIELD")? {
            self.max_on_field = v;
        }
        self.validate()?;
        Ok(self)
    }
}

fn read_env_u32(name: &'static str) -> Result<Option<u32>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        Err(_) => Ok(None),
    }
}
