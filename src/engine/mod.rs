//! Движок учёта игрового времени и ротации.
//!
//! Высокоуровневый объект: `MatchSession`
//! Основные операции:
//!   - `minutes_by_player` / `is_on_field` – учёт интервалов
//!   - `fair_share_ms` / `full_game_target_ms` – цели по времени
//!   - `suggest_rotation` – подсказка пакета замен
//!   - `apply_batch` – атомарное применение пакета замен

pub mod accounting;
pub mod audit;
pub mod errors;
pub mod rotation;
pub mod session;
pub mod substitution;
pub mod targets;

pub use accounting::{
    capped_minutes_by_player, is_on_field, minutes_by_player, minutes_for, on_field_ids,
    IntervalBook,
};
pub use audit::{latest_availability, reconstruct_intervals};
pub use errors::EngineError;
pub use rotation::{partition_eligible, suggest_rotation, RotationInput, RotationPools, RotationSuggestion};
pub use session::{MatchSession, Selection, StoreWrite};
pub use substitution::{apply_batch, pair_selections, validate_batch, SubstitutionBatch};
pub use targets::{deficit_ms, fair_share_ms, full_game_target_ms, surplus_ms, BalanceBadge, Targets};
