//! Учёт игрового времени и ротация состава для детского регби.
//!
//! Контроллер экрана матча держит `engine::MatchSession`, подаёт в неё
//! часы и действия тренера, а полученные `StoreWrite` отправляет в
//! хранилище. Итоги и история считаются по данным хранилища (`summary`).

pub mod api;
pub mod domain;
pub mod engine;
pub mod infra;
pub mod summary;
pub mod time_ctrl;

pub use domain::{MatchConfig, MatchId, Millis, PlayerId, PlayingInterval, Roster};
pub use engine::{EngineError, MatchSession, StoreWrite};
