//! Подсказка ротации: кого снять и кого выпустить, чтобы выровнять время.
//!
//! Алгоритм (жадный, детерминированный, один проход):
//!   1. Делим подходящих игроков на "на поле" и "в запасе".
//!   2. До перерыва убираем закреплённых (с поля) и придержанных (из запаса).
//!   3. Поле сортируем по убыванию перебора (сыграно − цель).
//!   4. Запас сортируем по убыванию недобора (цель − сыграно).
//!   5. При равенстве — по id игрока по возрастанию.
//!   6. Склеиваем первые k позиций, k = min(|поле|, |запас|, max_on_field).
//!
//! Подсказка ничего не меняет в интервалах, только заполняет выбор.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Availability, EligibilityFlags, Millis, PlayerId, Roster, SubPair};
use crate::engine::accounting::minutes_for;
use crate::engine::targets::{deficit_ms, surplus_ms};

/// Кандидаты на ротацию, уже разложенные по полю и запасу.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationPools {
    pub on_field: Vec<PlayerId>,
    pub bench: Vec<PlayerId>,
}

/// Разложить заявку на поле/запас.
///
/// Гости участвуют только при `include_guests`. В запас попадают только
/// пришедшие игроки; игрок на поле присутствует по определению.
pub fn partition_eligible(
    roster: &Roster,
    availability: &Availability,
    on_field: &BTreeSet<PlayerId>,
    include_guests: bool,
) -> RotationPools {
    let mut pools = RotationPools::default();

    for player in roster.players() {
        if player.is_guest && !include_guests {
            continue;
        }
        if on_field.contains(&player.id) {
            pools.on_field.push(player.id.clone());
        } else if availability.contains(&player.id) {
            pools.bench.push(player.id.clone());
        }
    }

    pools
}

/// Всё, что нужно алгоритму на входе.
#[derive(Clone, Debug)]
pub struct RotationInput<'a> {
    pub pools: &'a RotationPools,
    pub minutes: &'a BTreeMap<PlayerId, Millis>,
    pub target_ms: Millis,
    pub max_on_field: u32,
    pub before_halftime: bool,
    pub flags: &'a EligibilityFlags,
}

/// Предложенный пакет замен (эфемерный, не сохраняется).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotationSuggestion {
    pub pairs: Vec<SubPair>,
}

impl RotationSuggestion {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Уходящие с поля, в порядке пар.
    pub fn off_ids(&self) -> Vec<PlayerId> {
        self.pairs.iter().map(|p| p.off_id.clone()).collect()
    }

    /// Выходящие на поле, в порядке пар.
    pub fn on_ids(&self) -> Vec<PlayerId> {
        self.pairs.iter().map(|p| p.on_id.clone()).collect()
    }
}

/// Основной алгоритм подсказки.
///
/// Пустое поле или пустой запас (после фильтров) → пустая подсказка.
pub fn suggest_rotation(input: &RotationInput<'_>) -> RotationSuggestion {
    let off_candidates: Vec<&PlayerId> = input
        .pools
        .on_field
        .iter()
        .filter(|pid| input.flags.can_come_off(pid, input.before_halftime))
        .collect();

    let on_field: BTreeSet<&PlayerId> = input.pools.on_field.iter().collect();
    let on_candidates: Vec<&PlayerId> = input
        .pools
        .bench
        .iter()
        .filter(|pid| !on_field.contains(*pid))
        .filter(|pid| input.flags.can_come_on(pid, input.before_halftime))
        .collect();

    let off_ranked = rank_desc(off_candidates, |pid| {
        surplus_ms(minutes_for(input.minutes, pid), input.target_ms)
    });
    let on_ranked = rank_desc(on_candidates, |pid| {
        deficit_ms(minutes_for(input.minutes, pid), input.target_ms)
    });

    let k = off_ranked
        .len()
        .min(on_ranked.len())
        .min(input.max_on_field as usize);

    let pairs: Vec<SubPair> = on_ranked
        .into_iter()
        .zip(off_ranked)
        .take(k)
        .map(|(on_id, off_id)| SubPair {
            on_id: on_id.clone(),
            off_id: off_id.clone(),
        })
        .collect();

    debug!(pairs = pairs.len(), target_ms = input.target_ms, "подсказка ротации");

    RotationSuggestion { pairs }
}

/// Сортировка по убыванию ключа; при равенстве — по id по возрастанию.
fn rank_desc<'a>(ids: Vec<&'a PlayerId>, key: impl Fn(&PlayerId) -> i64) -> Vec<&'a PlayerId> {
    let mut keyed: Vec<(i64, &'a PlayerId)> = ids.into_iter().map(|pid| (key(pid), pid)).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    keyed.into_iter().map(|(_, pid)| pid).collect()
}
