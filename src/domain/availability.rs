use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;

/// Кто сегодня пришёл на матч.
///
/// Стартовый состав обязан быть подмножеством этого набора.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Availability {
    present: BTreeSet<PlayerId>,
}

impl Availability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a PlayerId>,
    {
        Self {
            present: ids.into_iter().cloned().collect(),
        }
    }

    /// Отметить игрока присутствующим/отсутствующим.
    /// Возвращает true, если состояние изменилось.
    pub fn set(&mut self, player_id: &PlayerId, present: bool) -> bool {
        if present {
            self.present.insert(player_id.clone())
        } else {
            self.present.remove(player_id)
        }
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.present.contains(player_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.present.iter()
    }

    /// Отсортированный по id список — в таком виде он уходит в журнал.
    pub fn to_vec(&self) -> Vec<PlayerId> {
        self.present.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

/// Ограничения на замены до перерыва.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EligibilityFlags {
    /// Игроки на поле, которых нельзя менять до перерыва.
    lock_until_halftime: BTreeSet<PlayerId>,
    /// Игроки запаса, которые выходят только со второго тайма.
    hold_for_halftime: BTreeSet<PlayerId>,
}

impl EligibilityFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_lock_until_halftime(&mut self, player_id: &PlayerId, locked: bool) {
        if locked {
            self.lock_until_halftime.insert(player_id.clone());
        } else {
            self.lock_until_halftime.remove(player_id);
        }
    }

    pub fn set_hold_for_halftime(&mut self, player_id: &PlayerId, held: bool) {
        if held {
            self.hold_for_halftime.insert(player_id.clone());
        } else {
            self.hold_for_halftime.remove(player_id);
        }
    }

    pub fn is_locked_until_halftime(&self, player_id: &PlayerId) -> bool {
        self.lock_until_halftime.contains(player_id)
    }

    pub fn is_held_for_halftime(&self, player_id: &PlayerId) -> bool {
        self.hold_for_halftime.contains(player_id)
    }

    /// Можно ли снять игрока с поля в данный момент.
    pub fn can_come_off(&self, player_id: &PlayerId, before_halftime: bool) -> bool {
        !(before_halftime && self.is_locked_until_halftime(player_id))
    }

    /// Можно ли выпустить игрока на поле в данный момент.
    pub fn can_come_on(&self, player_id: &PlayerId, before_halftime: bool) -> bool {
        !(before_halftime && self.is_held_for_halftime(player_id))
    }
}
