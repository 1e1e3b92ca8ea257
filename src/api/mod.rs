//! Внешний API экрана матча.
//!
//! Здесь описываются:
//! - команды (commands.rs) — всё, что меняет сессию (присутствие, часы, замены, отметки);
//! - запросы (queries.rs) — только чтение;
//! - DTO (dto.rs) — удобные структуры для экрана;
//! - ошибки (errors.rs) — то, что видит контроллер.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
