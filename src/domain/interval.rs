use serde::{Deserialize, Serialize};

use crate::domain::{Millis, PlayerId};

/// Один непрерывный отрезок, который игрок провёл на поле.
///
/// `end_ms == None` — игрок всё ещё на поле (открытый интервал).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayingInterval {
    pub player_id: PlayerId,
    pub start_ms: Millis,
    #[serde(default)]
    pub end_ms: Option<Millis>,
}

impl PlayingInterval {
    pub fn open(player_id: PlayerId, start_ms: Millis) -> Self {
        Self {
            player_id,
            start_ms,
            end_ms: None,
        }
    }

    pub fn closed(player_id: PlayerId, start_ms: Millis, end_ms: Millis) -> Self {
        Self {
            player_id,
            start_ms,
            end_ms: Some(end_ms),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_ms.is_none()
    }

    /// Длительность на момент `now_ms`: открытый интервал "ещё идёт".
    /// Никогда не отрицательна, даже если данные часов противоречивы.
    pub fn duration_at(&self, now_ms: Millis) -> Millis {
        self.end_ms.unwrap_or(now_ms).saturating_sub(self.start_ms)
    }

    /// Длительность с ограничением открытого интервала значением `cap`.
    /// Без `cap` открытый интервал считается нулевым.
    pub fn capped_duration(&self, cap: Option<Millis>) -> Millis {
        let end = self.end_ms.or(cap).unwrap_or(self.start_ms);
        end.saturating_sub(self.start_ms)
    }
}
