//! Пакетная замена: все пары пакета применяются как одно целое.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{EventKind, MatchEvent, Millis, PlayerId, PlayingInterval, SubPair};
use crate::engine::accounting::IntervalBook;
use crate::engine::EngineError;

/// Применённый пакет замен — нагрузка для журнала событий.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubstitutionBatch {
    pub at_ms: Millis,
    pub pairs: Vec<SubPair>,
    /// Закрытые интервалы уходящих, в порядке пар. Конец уже прижат к началу,
    /// если часы отстают от начала интервала.
    #[serde(default)]
    pub closed: Vec<PlayingInterval>,
}

impl SubstitutionBatch {
    pub fn off_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.pairs.iter().map(|p| &p.off_id)
    }

    pub fn on_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.pairs.iter().map(|p| &p.on_id)
    }

    /// Событие `SUB` со списком пар в `note`.
    pub fn to_event(&self) -> Result<MatchEvent, EngineError> {
        Ok(MatchEvent::with_payload(EventKind::Sub, self.at_ms, &self.pairs)?)
    }
}

/// Собрать пары из двух выбранных списков (позиционно).
///
/// Списки разной длины не склеиваются — это ошибка выбора, а не повод
/// молча отбросить хвост.
pub fn pair_selections(off: &[PlayerId], on: &[PlayerId]) -> Result<Vec<SubPair>, EngineError> {
    if off.is_empty() && on.is_empty() {
        return Err(EngineError::EmptyBatch);
    }
    if off.len() != on.len() {
        return Err(EngineError::SelectionMismatch {
            off: off.len(),
            on: on.len(),
        });
    }
    Ok(on
        .iter()
        .zip(off)
        .map(|(on_id, off_id)| SubPair {
            on_id: on_id.clone(),
            off_id: off_id.clone(),
        })
        .collect())
}

/// Проверить пакет целиком, ничего не меняя.
pub fn validate_batch(book: &IntervalBook, pairs: &[SubPair]) -> Result<(), EngineError> {
    if pairs.is_empty() {
        return Err(EngineError::EmptyBatch);
    }

    let mut seen = BTreeSet::new();
    for pair in pairs {
        for pid in [&pair.off_id, &pair.on_id] {
            if !seen.insert(pid) {
                return Err(EngineError::DuplicateInBatch(pid.clone()));
            }
        }
        if !book.is_on_field(&pair.off_id) {
            return Err(EngineError::NotOnField(pair.off_id.clone()));
        }
        if book.is_on_field(&pair.on_id) {
            return Err(EngineError::AlreadyOnField(pair.on_id.clone()));
        }
    }

    Ok(())
}

/// Применить пакет замен в момент `at_ms`.
///
/// Сначала проверяется весь пакет; затем все закрытия и открытия делаются
/// на копии книги, которая подменяет оригинал только при полном успехе.
pub fn apply_batch(
    book: &mut IntervalBook,
    pairs: Vec<SubPair>,
    at_ms: Millis,
) -> Result<SubstitutionBatch, EngineError> {
    if let Err(err) = validate_batch(book, &pairs) {
        warn!(error = %err, at_ms, "пакет замен отклонён");
        return Err(err);
    }

    let mut next = book.clone();
    let mut closed = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        closed.push(next.close_interval(&pair.off_id, at_ms)?);
    }
    for pair in &pairs {
        next.open_interval(&pair.on_id, at_ms)?;
    }
    *book = next;

    debug!(pairs = pairs.len(), at_ms, "пакет замен применён");

    Ok(SubstitutionBatch {
        at_ms,
        pairs,
        closed,
    })
}
