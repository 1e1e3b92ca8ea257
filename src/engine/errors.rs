use crate::domain::{EventKind, MatchStatus, PlayerId};

use thiserror::Error;

/// Ошибки движка учёта игрового времени.
///
/// Все ошибки локальные: операция отклонена, состояние не тронуто.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Игрок {0} уже на поле")]
    AlreadyOnField(PlayerId),

    #[error("Игрок {0} сейчас не на поле")]
    NotOnField(PlayerId),

    #[error("Игрок {0} не заявлен на матч")]
    UnknownPlayer(PlayerId),

    #[error("Игрок {0} сегодня не пришёл")]
    NotAvailable(PlayerId),

    #[error("Игрок {0} закреплён на поле до перерыва")]
    PlayerLocked(PlayerId),

    #[error("Игрок {0} выходит только после перерыва")]
    PlayerHeld(PlayerId),

    #[error("Игрок {0} встречается в пакете замен больше одного раза")]
    DuplicateInBatch(PlayerId),

    #[error("Пакет замен пуст")]
    EmptyBatch,

    #[error("Выбрано {off} уходящих и {on} выходящих, пары не собрать")]
    SelectionMismatch { off: usize, on: usize },

    #[error("На поле уже {max} игроков")]
    FieldFull { max: usize },

    #[error("Недостаточно игроков: нужно {required}, пришли {available}")]
    NotEnoughPlayers { required: usize, available: usize },

    #[error("Некорректный стартовый состав: {0}")]
    InvalidLineup(String),

    #[error("Операция недоступна: матч в статусе {actual:?}, нужен {expected:?}")]
    InvalidStatus {
        expected: MatchStatus,
        actual: MatchStatus,
    },

    #[error("Некорректная настройка матча: {0}")]
    InvalidConfig(String),

    #[error("Событие {0:?} нельзя отметить вручную")]
    NotAQuickAction(EventKind),

    #[error("Повреждённое событие журнала: {0}")]
    MalformedEvent(String),

    #[error("Нечего отменять")]
    NothingToUndo,
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::MalformedEvent(err.to_string())
    }
}
