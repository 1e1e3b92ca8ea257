//! Инфраструктурный слой вокруг движка:
//! - генерация ID;
//! - RNG для симуляции;
//! - абстракция хранения и отправка записей сессии;
//! - согласование с обновлениями из хранилища.

pub mod ids;
pub mod persistence;
pub mod reconcile;
pub mod rng;
pub mod simulate;

pub use ids::*;
pub use persistence::*;
pub use reconcile::*;
pub use rng::*;
pub use simulate::*;
