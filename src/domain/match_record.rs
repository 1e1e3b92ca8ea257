use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MatchId, Millis};

/// Статус матча.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Создан, состав ещё не вышел на поле.
    Draft,
    /// Идёт игра.
    Live,
    /// Финальный свисток прозвучал.
    Final,
}

/// Строка матча в истории команды.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    pub id: MatchId,
    pub opponent: String,
    pub status: MatchStatus,
    pub half_length_minutes: u32,
    pub max_on_field: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Длительность завершённого матча по отметкам начала/конца.
    ///
    /// None, если матч не завершён или нет отметки начала.
    pub fn match_length_ms(&self) -> Option<Millis> {
        let (started, completed) = (self.started_at?, self.completed_at?);
        let length = (completed - started).num_milliseconds();
        Some(length.max(0) as Millis)
    }
}
