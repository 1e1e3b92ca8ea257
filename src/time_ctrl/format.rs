//! Форматирование времени для экрана матча и итогов.

use crate::domain::Millis;

/// `mm:ss` по миллисекундам (секунды округляются вниз).
pub fn fmt_clock(ms: Millis) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Отклонение со знаком: `+01:05` / `-00:30`.
pub fn fmt_signed(diff_ms: i64) -> String {
    let sign = if diff_ms >= 0 { '+' } else { '-' };
    format!("{}{}", sign, fmt_clock(diff_ms.unsigned_abs()))
}

/// Минуты с округлением до ближайшей: `"12 min"`.
pub fn fmt_minutes(ms: Millis) -> String {
    format!("{} min", (ms + 30_000) / 60_000)
}
