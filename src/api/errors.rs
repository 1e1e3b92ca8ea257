use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;
use crate::engine::EngineError;

/// Ошибки внешнего API (то, что отдаём контроллеру экрана).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Неправильные входные данные (например, битый JSON).
    BadRequest(String),

    /// Игрок не заявлен на матч.
    UnknownPlayer(PlayerId),

    /// Команда не может быть выполнена в текущем статусе матча.
    InvalidCommand(String),

    /// Операция отклонена движком.
    EngineError(String),

    /// Внутренняя ошибка.
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownPlayer(pid) => ApiError::UnknownPlayer(pid),
            EngineError::InvalidStatus { .. } | EngineError::NothingToUndo => {
                ApiError::InvalidCommand(err.to_string())
            }
            EngineError::MalformedEvent(msg) => ApiError::Internal(msg),
            other => ApiError::EngineError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
