//! Согласование локального вида с хранилищем.
//!
//! Обновление из хранилища заменяет локальный вид целиком (последний
//! писатель выигрывает). Сразу после собственной записи обновления
//! глушатся на `refresh_debounce_ms`, чтобы эхо своей же записи не
//! откатило локальное состояние. Версий нет: пересекающиеся пакеты с двух
//! устройств дают неопределённый результат.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{MatchConfig, Millis};
use crate::engine::{EngineError, MatchSession};
use crate::infra::persistence::{EventLog, IntervalStore};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RefreshDecision {
    Apply,
    Discard,
}

#[derive(Clone, Debug, Default)]
pub struct RefreshReconciler {
    debounce_ms: Millis,
    last_local_write: Option<Millis>,
}

impl RefreshReconciler {
    pub fn new(debounce_ms: Millis) -> Self {
        Self {
            debounce_ms,
            last_local_write: None,
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.refresh_debounce_ms)
    }

    /// Отметить собственную запись (время хоста, монотонное).
    pub fn note_local_write(&mut self, at_ms: Millis) {
        self.last_local_write = Some(at_ms);
    }

    pub fn offer_refresh(&self, at_ms: Millis) -> RefreshDecision {
        match self.last_local_write {
            Some(last) if at_ms < last.saturating_add(self.debounce_ms) => {
                debug!(at_ms, last, "обновление отброшено: своя запись слишком свежая");
                RefreshDecision::Discard
            }
            _ => RefreshDecision::Apply,
        }
    }

    /// Перечитать матч из хранилища, если обновление не попадает в окно.
    ///
    /// Возвращает true, если локальный вид был заменён.
    pub fn refresh_session<S>(
        &self,
        session: &mut MatchSession,
        store: &S,
        at_ms: Millis,
    ) -> Result<bool, EngineError>
    where
        S: IntervalStore + EventLog,
    {
        if self.offer_refresh(at_ms) == RefreshDecision::Discard {
            return Ok(false);
        }
        let match_id = session.match_id();
        session.apply_refresh(store.load_intervals(match_id), store.load_events(match_id))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let mut r = RefreshReconciler::new(750);
        assert_eq!(r.offer_refresh(0), RefreshDecision::Apply);
        r.note_local_write(1_000);
        assert_eq!(r.offer_refresh(1_749), RefreshDecision::Discard);
        assert_eq!(r.offer_refresh(1_750), RefreshDecision::Apply);
    }
}
