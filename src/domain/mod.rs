//! Доменная модель матча: игроки, составы, интервалы на поле, события,
//! конфигурация матча и присутствие игроков.

pub mod availability;
pub mod config;
pub mod event;
pub mod interval;
pub mod match_record;
pub mod player;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Смещение от начала матча в миллисекундах (часы матча).
pub type Millis = u64;

/// Идентификатор матча.
pub type MatchId = u64;

/// Идентификатор игрока.
///
/// Снаружи приходит строкой (uuid из хранилища или `p1..pN` для заглушек).
/// Порядок по id — детерминированный вторичный ключ при равенстве рангов.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub use availability::*;
pub use config::*;
pub use event::*;
pub use interval::*;
pub use match_record::*;
pub use player::*;
