use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Millis, PlayerId};

/// Тип записи в журнале событий матча.
///
/// Сериализуется в том же виде, в каком хранится в журнале (`"TRY"`, `"SUB"`, ...).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Занесённая попытка.
    Try,
    /// Захват.
    Tackle,
    /// Произвольная заметка тренера.
    Other,
    /// Пакетная замена; в `note` лежит JSON-список пар.
    Sub,
    /// Ручной выпуск игрока на поле.
    SendOn,
    /// Ручной уход игрока с поля.
    TakeOff,
    /// Стартовый состав; в `note` лежит JSON-список id.
    Lineup,
    /// Снимок присутствующих игроков; в `note` лежит JSON-список id.
    Availability,
    /// Финальный свисток: все открытые интервалы закрыты.
    FullTime,
}

impl EventKind {
    /// События, которые тренер отмечает кнопками во время игры.
    pub fn is_quick_action(self) -> bool {
        matches!(self, EventKind::Try | EventKind::Tackle | EventKind::Other)
    }
}

/// Одна замена в пакете: кто выходит на поле и кто уходит.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SubPair {
    pub on_id: PlayerId,
    pub off_id: PlayerId,
}

impl SubPair {
    pub fn new(on_id: impl Into<PlayerId>, off_id: impl Into<PlayerId>) -> Self {
        Self {
            on_id: on_id.into(),
            off_id: off_id.into(),
        }
    }
}

/// Запись журнала событий: `{kind, at_ms, player_id?, note?}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEvent {
    pub kind: EventKind,
    pub at_ms: Millis,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub note: Option<String>,
}

impl MatchEvent {
    pub fn new(kind: EventKind, at_ms: Millis) -> Self {
        Self {
            kind,
            at_ms,
            player_id: None,
            note: None,
        }
    }

    pub fn for_player(kind: EventKind, at_ms: Millis, player_id: PlayerId) -> Self {
        Self {
            player_id: Some(player_id),
            ..Self::new(kind, at_ms)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Событие со структурированной нагрузкой, упакованной в `note` как JSON.
    pub fn with_payload<T: Serialize>(
        kind: EventKind,
        at_ms: Millis,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let note = serde_json::to_string(payload)?;
        Ok(Self::new(kind, at_ms).with_note(note))
    }

    /// Распаковать JSON-нагрузку из `note`. Пустой `note` читается как `null`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.note.as_deref().unwrap_or("null"))
    }
}
