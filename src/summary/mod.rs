//! Итоги матча и история команды.
//!
//! Чистые функции над данными из хранилища: живых часов здесь нет,
//! поэтому открытые интервалы всегда обрезаются по явной границе.

pub mod history;
pub mod match_summary;

pub use history::{aggregate_history, duplicate_as_draft, reopen, HistoryFilter, HistoryRow, HISTORY_LIMIT};
pub use match_summary::{
    build_summary, full_time_at, tally_events, EventTally, MatchSummary, PlayerSummaryRow,
};
