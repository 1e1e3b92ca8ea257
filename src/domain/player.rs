use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;

/// Игрок в заявке на матч.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Инициалы из карточки игрока (используются, если имя пустое).
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub shirt_number: Option<u32>,
    /// Гость: взят из другого состава только на этот матч.
    #[serde(default)]
    pub is_guest: bool,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            initials: None,
            shirt_number: None,
            is_guest: false,
        }
    }

    pub fn with_shirt(mut self, shirt_number: u32) -> Self {
        self.shirt_number = Some(shirt_number);
        self
    }

    pub fn as_guest(mut self) -> Self {
        self.is_guest = true;
        self
    }

    /// Отображаемое имя: имя без пробелов по краям, иначе инициалы, иначе "Player".
    pub fn display_name(&self) -> String {
        let trimmed = self.name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        match self.initials.as_deref().map(str::trim) {
            Some(initials) if !initials.is_empty() => initials.to_string(),
            _ => "Player".to_string(),
        }
    }
}

/// Заявка на матч: игроки своего состава + гости.
///
/// Порядок игроков сохраняется: от него зависит выбор стартового состава
/// по умолчанию.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Собрать заявку; повторные id отбрасываются (побеждает первый).
    pub fn new(players: Vec<Player>) -> Self {
        let mut roster = Self::default();
        for p in players {
            roster.push(p);
        }
        roster
    }

    /// Заявка-заглушка `p1..pN` с именами "N. Player".
    pub fn placeholder(count: usize) -> Self {
        let players = (1..=count)
            .map(|i| Player::new(format!("p{}", i), format!("{}. Player", i)).with_shirt(i as u32))
            .collect();
        Self::new(players)
    }

    /// Добавить игрока. Возвращает false, если такой id уже есть.
    pub fn push(&mut self, player: Player) -> bool {
        if self.contains(&player.id) {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Подмешать гостей из другого состава (только на этот матч).
    ///
    /// Возвращает количество реально добавленных игроков.
    pub fn merge_guests<I>(&mut self, guests: I) -> usize
    where
        I: IntoIterator<Item = Player>,
    {
        let mut added = 0;
        for guest in guests {
            if self.push(guest.as_guest()) {
                added += 1;
            }
        }
        added
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.iter().map(|p| &p.id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_guest(&self, id: &PlayerId) -> bool {
        self.get(id).map(|p| p.is_guest).unwrap_or(false)
    }
}
