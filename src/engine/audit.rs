//! Восстановление интервалов и присутствия из журнала событий.
//!
//! Журнал не участвует в подсчёте минут (минуты берутся только из
//! интервалов), но по нему можно перепроверить историю матча.

use tracing::debug;

use crate::domain::{Availability, EventKind, MatchEvent, PlayerId, SubPair};
use crate::engine::accounting::IntervalBook;
use crate::engine::substitution::apply_batch;
use crate::engine::EngineError;

/// Проиграть журнал и собрать книгу интервалов.
///
/// Учитываются `LINEUP`, `SUB`, `SEND_ON`, `TAKE_OFF`, `FULL_TIME`;
/// остальные события пропускаются.
pub fn reconstruct_intervals(events: &[MatchEvent]) -> Result<IntervalBook, EngineError> {
    let mut book = IntervalBook::new();

    for event in events {
        match event.kind {
            EventKind::Lineup => {
                let starters: Vec<PlayerId> = event.payload()?;
                for pid in &starters {
                    book.open_interval(pid, event.at_ms)?;
                }
            }
            EventKind::Sub => {
                let pairs: Vec<SubPair> = event.payload()?;
                apply_batch(&mut book, pairs, event.at_ms)?;
            }
            EventKind::SendOn => {
                book.open_interval(required_player(event)?, event.at_ms)?;
            }
            EventKind::TakeOff => {
                book.close_interval(required_player(event)?, event.at_ms)?;
            }
            EventKind::FullTime => {
                book.close_all(event.at_ms);
            }
            EventKind::Try | EventKind::Tackle | EventKind::Other | EventKind::Availability => {}
        }
    }

    debug!(events = events.len(), intervals = book.len(), "интервалы восстановлены из журнала");

    Ok(book)
}

/// Последний снимок присутствия из журнала (если он был).
pub fn latest_availability(events: &[MatchEvent]) -> Result<Option<Availability>, EngineError> {
    let Some(event) = events
        .iter()
        .rev()
        .find(|e| e.kind == EventKind::Availability)
    else {
        return Ok(None);
    };

    let ids: Vec<PlayerId> = event.payload()?;
    Ok(Some(Availability::from_ids(&ids)))
}

fn required_player(event: &MatchEvent) -> Result<&PlayerId, EngineError> {
    event.player_id.as_ref().ok_or_else(|| {
        EngineError::MalformedEvent(format!("{:?} на {} мс без игрока", event.kind, event.at_ms))
    })
}
