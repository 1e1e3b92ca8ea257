use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng, SeedableRng};

/// Источник случайности для симуляции матча.
pub trait RandomSource {
    /// Событие с вероятностью `p` (0.0..=1.0).
    fn chance(&mut self, p: f64) -> bool;

    /// Случайное число в `[low, high)`; при `low >= high` возвращает `low`.
    fn range(&mut self, low: u64, high: u64) -> u64;

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>;
}

#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl RandomSource for SystemRng {
    fn chance(&mut self, p: f64) -> bool {
        thread_rng().gen_bool(p.clamp(0.0, 1.0))
    }

    fn range(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        thread_rng().gen_range(low..high)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut thread_rng())
    }
}

/// Детерминированный RNG для тестов и реплея.
/// Один и тот же seed даёт один и тот же матч.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: StdRng,
}

impl DeterministicRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for DeterministicRng {
    fn chance(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    fn range(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }
}
