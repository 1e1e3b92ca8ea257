use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::MatchId;

/// Генерация ID на основе монотонных счётчиков.
///
/// Для локальных прогонов и тестов; в боевом хранилище ID выдаёт база.
#[derive(Debug)]
pub struct IdGenerator {
    match_counter: AtomicU64,
}

impl IdGenerator {
    /// Создать генератор с начальным значением 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            match_counter: AtomicU64::new(first),
        }
    }

    #[inline]
    pub fn next_match_id(&self) -> MatchId {
        self.match_counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
