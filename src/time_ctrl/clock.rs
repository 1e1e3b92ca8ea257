// src/time_ctrl/clock.rs
//! Часы матча: идут только в режиме "running", на паузе стоят.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::Millis;

/// Состояние часов матча.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchClock {
    /// Сколько миллисекунд матча прошло.
    elapsed_ms: Millis,
    /// Идут ли часы сейчас.
    running: bool,
    /// Отметка предыдущего кадра (монотонное время хоста, мс).
    /// Сбрасывается при паузе, чтобы пауза не попала в матч.
    #[serde(skip)]
    last_frame_ms: Option<Millis>,
}

impl MatchClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> Millis {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
        self.last_frame_ms = None;
    }

    /// Переключить старт/пауза. Возвращает новое состояние.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
        self.running
    }

    /// Прибавить `delta_ms`, если часы идут. Возвращает текущее значение.
    pub fn advance(&mut self, delta_ms: Millis) -> Millis {
        if self.running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        }
        self.elapsed_ms
    }

    /// Колбэк кадра: `frame_ms` — монотонная отметка времени хоста.
    ///
    /// Первый кадр после старта только запоминает отметку. Считаем по
    /// разнице абсолютных отметок, поэтому округление не накапливается.
    pub fn on_frame(&mut self, frame_ms: Millis) -> Millis {
        if !self.running {
            self.last_frame_ms = None;
            return self.elapsed_ms;
        }

        let delta = match self.last_frame_ms {
            Some(prev) if frame_ms < prev => {
                warn!(prev, frame_ms, "отметка кадра ушла назад, кадр пропущен");
                0
            }
            Some(prev) => frame_ms - prev,
            None => 0,
        };
        self.last_frame_ms = Some(frame_ms);
        self.advance(delta)
    }

    /// Выставить время напрямую (откат к снимку). Часы встают на паузу.
    pub fn restore(&mut self, elapsed_ms: Millis) {
        self.elapsed_ms = elapsed_ms;
        self.pause();
    }

    /// Вернуть время к нулю, не трогая старт/паузу.
    pub fn rewind(&mut self) {
        self.elapsed_ms = 0;
        self.last_frame_ms = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
