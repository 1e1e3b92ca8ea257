// src/engine/session.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{
    Availability, EligibilityFlags, EventKind, MatchConfig, MatchEvent, MatchId, MatchStatus,
    Millis, Player, PlayerId, PlayingInterval, Roster, SubPair,
};
use crate::engine::accounting::IntervalBook;
use crate::engine::audit::latest_availability;
use crate::engine::rotation::{partition_eligible, suggest_rotation, RotationInput, RotationPools};
use crate::engine::substitution::{apply_batch, pair_selections, SubstitutionBatch};
use crate::engine::targets::Targets;
use crate::engine::EngineError;
use crate::time_ctrl::{MatchClock, MatchPhase};

/// Что контроллер должен отправить во внешнее хранилище после операции.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreWrite {
    /// Вставка `{match_id, player_id, start_ms}`.
    OpenInterval { player_id: PlayerId, start_ms: Millis },
    /// Обновление единственной открытой строки игрока: `end_ms`.
    CloseInterval { player_id: PlayerId, end_ms: Millis },
    /// Запись в журнал событий.
    AppendEvent(MatchEvent),
    /// Сброс матча: удалить все интервалы и события.
    ResetMatch,
}

/// Текущий выбор на экране: кого снимать и кого выпускать.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub off: Vec<PlayerId>,
    pub on: Vec<PlayerId>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.off.clear();
        self.on.clear();
    }

    /// Кнопка подтверждения активна только при равных непустых списках.
    pub fn is_confirmable(&self) -> bool {
        !self.off.is_empty() && self.off.len() == self.on.len()
    }
}

/// "Замороженное" состояние для отмены.
#[derive(Clone, Debug)]
struct SessionSnapshot {
    book: IntervalBook,
    availability: Availability,
    events: Vec<MatchEvent>,
    elapsed_ms: Millis,
    max_on_field: u32,
    status: MatchStatus,
}

/// Сессия одного матча.
///
/// Создаётся на матч и выбрасывается при сбросе. Держит всё, что раньше
/// жило в глобальном состоянии экрана: присутствие, флаги перерыва, часы,
/// локальный вид интервалов и журнала, выбор и историю отмены.
///
/// Каждая изменяющая операция возвращает список `StoreWrite`, который
/// контроллер обязан отправить в хранилище одним пакетом.
#[derive(Clone, Debug)]
pub struct MatchSession {
    match_id: MatchId,
    config: MatchConfig,
    roster: Roster,
    status: MatchStatus,
    availability: Availability,
    flags: EligibilityFlags,
    clock: MatchClock,
    book: IntervalBook,
    events: Vec<MatchEvent>,
    selection: Selection,
    history: Vec<SessionSnapshot>,
}

impl MatchSession {
    /// Новая сессия. По умолчанию все заявленные игроки считаются пришедшими.
    pub fn new(match_id: MatchId, config: MatchConfig, roster: Roster) -> Self {
        let availability = Availability::from_ids(roster.ids());
        info!(match_id, players = roster.len(), "сессия матча создана");
        Self {
            match_id,
            config,
            roster,
            status: MatchStatus::Draft,
            availability,
            flags: EligibilityFlags::new(),
            clock: MatchClock::new(),
            book: IntervalBook::new(),
            events: Vec::new(),
            selection: Selection::default(),
            history: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Чтение
    // ---------------------------------------------------------------------

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn flags(&self) -> &EligibilityFlags {
        &self.flags
    }

    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    pub fn intervals(&self) -> &[PlayingInterval] {
        self.book.intervals()
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn now_ms(&self) -> Millis {
        self.clock.elapsed_ms()
    }

    pub fn phase(&self) -> MatchPhase {
        MatchPhase::at(self.now_ms(), &self.config)
    }

    pub fn is_before_halftime(&self) -> bool {
        self.phase().is_before_halftime()
    }

    pub fn is_on_field(&self, player_id: &PlayerId) -> bool {
        self.book.is_on_field(player_id)
    }

    /// Игроки на поле в порядке заявки.
    pub fn on_field(&self) -> Vec<&Player> {
        self.roster
            .players()
            .iter()
            .filter(|p| self.book.is_on_field(&p.id))
            .collect()
    }

    /// Все остальные заявленные игроки в порядке заявки.
    pub fn bench(&self) -> Vec<&Player> {
        self.roster
            .players()
            .iter()
            .filter(|p| !self.book.is_on_field(&p.id))
            .collect()
    }

    pub fn minutes(&self) -> BTreeMap<PlayerId, Millis> {
        self.book.minutes(self.now_ms())
    }

    /// Сколько игроков делят время: пришедшие, без гостей (если гости не
    /// участвуют в ротации).
    pub fn pool_size(&self) -> usize {
        self.roster
            .players()
            .iter()
            .filter(|p| self.config.guests_in_rotation || !p.is_guest)
            .filter(|p| self.availability.contains(&p.id))
            .count()
    }

    pub fn targets(&self) -> Targets {
        Targets::compute(&self.config, self.now_ms(), self.pool_size())
    }

    pub fn fair_share_ms(&self) -> Millis {
        self.targets().fair_share_ms
    }

    pub fn full_game_target_ms(&self) -> Millis {
        self.targets().full_game_target_ms
    }

    pub fn rotation_pools(&self) -> RotationPools {
        partition_eligible(
            &self.roster,
            &self.availability,
            &self.book.on_field_ids(),
            self.config.guests_in_rotation,
        )
    }

    /// Стартовый состав по умолчанию: первые `max_on_field` пришедших,
    /// свои игроки раньше гостей.
    pub fn default_starters(&self) -> Vec<PlayerId> {
        let (home, guests): (Vec<&Player>, Vec<&Player>) = self
            .roster
            .players()
            .iter()
            .filter(|p| self.availability.contains(&p.id))
            .partition(|p| !p.is_guest);

        home.into_iter()
            .chain(guests)
            .take(self.config.max_on_field as usize)
            .map(|p| p.id.clone())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Настройка до/во время матча
    // ---------------------------------------------------------------------

    /// Отметить игрока пришедшим/отсутствующим.
    ///
    /// Игрока на поле нельзя отметить отсутствующим. При изменении в журнал
    /// уходит снимок присутствия, а прежнее состояние попадает в историю отмены.
    pub fn set_available(
        &mut self,
        player_id: &PlayerId,
        present: bool,
    ) -> Result<Vec<StoreWrite>, EngineError> {
        self.require_known(player_id)?;
        if !present && self.book.is_on_field(player_id) {
            return Err(EngineError::AlreadyOnField(player_id.clone()));
        }
        if self.availability.contains(player_id) == present {
            return Ok(Vec::new());
        }
        self.snapshot();
        self.availability.set(player_id, present);
        if !present {
            self.selection.on.retain(|p| p != player_id);
        }
        debug!(player = %player_id, present, "присутствие изменено");
        self.availability_snapshot()
    }

    /// Заменить набор пришедших целиком.
    pub fn set_availability(&mut self, ids: &[PlayerId]) -> Result<Vec<StoreWrite>, EngineError> {
        for pid in ids {
            self.require_known(pid)?;
        }
        let next = Availability::from_ids(ids);
        if let Some(pid) = self.book.on_field_ids().iter().find(|p| !next.contains(p)) {
            return Err(EngineError::AlreadyOnField(pid.clone()));
        }
        self.snapshot();
        self.availability = next;
        self.selection.on.retain(|p| self.availability.contains(p));
        self.availability_snapshot()
    }

    pub fn set_lock_until_halftime(
        &mut self,
        player_id: &PlayerId,
        locked: bool,
    ) -> Result<(), EngineError> {
        self.require_known(player_id)?;
        self.flags.set_lock_until_halftime(player_id, locked);
        if locked && self.is_before_halftime() {
            self.selection.off.retain(|p| p != player_id);
        }
        Ok(())
    }

    pub fn set_hold_for_halftime(
        &mut self,
        player_id: &PlayerId,
        held: bool,
    ) -> Result<(), EngineError> {
        self.require_known(player_id)?;
        self.flags.set_hold_for_halftime(player_id, held);
        if held && self.is_before_halftime() {
            self.selection.on.retain(|p| p != player_id);
        }
        Ok(())
    }

    /// Поменять формат (сколько на поле). Попадает в снимок отмены.
    pub fn set_max_on_field(&mut self, max_on_field: u32) -> Result<(), EngineError> {
        let mut next = self.config.clone();
        next.max_on_field = max_on_field;
        next.validate().map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        self.snapshot();
        self.config = next;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Ход матча
    // ---------------------------------------------------------------------

    /// Выпустить стартовый состав на 0-й миллисекунде.
    ///
    /// Часы матча при этом возвращаются к нулю (ход часов сохраняется).
    ///
    /// Состав: без повторов, только пришедшие, ровно `max_on_field` игроков.
    pub fn start_match(&mut self, starters: &[PlayerId]) -> Result<Vec<StoreWrite>, EngineError> {
        self.require_status(MatchStatus::Draft)?;

        let required = self.config.max_on_field as usize;
        if self.availability.len() < required {
            return Err(EngineError::NotEnoughPlayers {
                required,
                available: self.availability.len(),
            });
        }
        if starters.len() != required {
            return Err(EngineError::InvalidLineup(format!(
                "нужно {} стартовых, выбрано {}",
                required,
                starters.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for pid in starters {
            self.require_known(pid)?;
            if !self.availability.contains(pid) {
                return Err(EngineError::NotAvailable(pid.clone()));
            }
            if !seen.insert(pid) {
                return Err(EngineError::DuplicateInBatch(pid.clone()));
            }
        }

        self.snapshot();

        // матч всегда начинается с нуля, даже если часы тронули до стартового свистка
        self.clock.rewind();
        let at_ms = 0;
        let mut writes = Vec::with_capacity(starters.len() + 1);
        for pid in starters {
            self.book.open_interval(pid, at_ms)?;
            writes.push(StoreWrite::OpenInterval {
                player_id: pid.clone(),
                start_ms: at_ms,
            });
        }

        let lineup = MatchEvent::with_payload(EventKind::Lineup, at_ms, &starters)?;
        writes.push(self.push_event(lineup));

        self.status = MatchStatus::Live;
        info!(match_id = self.match_id, starters = starters.len(), "матч начат");

        Ok(writes)
    }

    /// Старт/пауза часов. Возвращает новое состояние.
    pub fn toggle_clock(&mut self) -> bool {
        self.snapshot();
        let running = self.clock.toggle();
        debug!(running, at_ms = self.now_ms(), "часы переключены");
        running
    }

    pub fn start_clock(&mut self) {
        if !self.clock.is_running() {
            self.toggle_clock();
        }
    }

    pub fn pause_clock(&mut self) {
        if self.clock.is_running() {
            self.toggle_clock();
        }
    }

    /// Прибавить время (если часы идут).
    pub fn advance(&mut self, delta_ms: Millis) -> Millis {
        self.clock.advance(delta_ms)
    }

    /// Колбэк кадра с монотонной отметкой хоста.
    pub fn on_frame(&mut self, frame_ms: Millis) -> Millis {
        self.clock.on_frame(frame_ms)
    }

    // ---------------------------------------------------------------------
    // Выбор и замены
    // ---------------------------------------------------------------------

    /// Посчитать подсказку ротации и положить её в выбор.
    pub fn suggest_rotation(&mut self) -> Vec<SubPair> {
        let pools = self.rotation_pools();
        let minutes = self.minutes();
        let input = RotationInput {
            pools: &pools,
            minutes: &minutes,
            target_ms: self.full_game_target_ms(),
            max_on_field: self.config.max_on_field,
            before_halftime: self.is_before_halftime(),
            flags: &self.flags,
        };
        let suggestion = suggest_rotation(&input);

        self.selection.off = suggestion.off_ids();
        self.selection.on = suggestion.on_ids();

        suggestion.pairs
    }

    /// Отметить/снять отметку "уходит с поля".
    pub fn toggle_off_selection(&mut self, player_id: &PlayerId) -> Result<bool, EngineError> {
        self.require_known(player_id)?;
        if !self.book.is_on_field(player_id) {
            return Err(EngineError::NotOnField(player_id.clone()));
        }
        if !self.flags.can_come_off(player_id, self.is_before_halftime()) {
            return Err(EngineError::PlayerLocked(player_id.clone()));
        }
        Ok(toggle_in(&mut self.selection.off, player_id))
    }

    /// Отметить/снять отметку "выходит на поле".
    pub fn toggle_on_selection(&mut self, player_id: &PlayerId) -> Result<bool, EngineError> {
        self.require_known(player_id)?;
        if self.book.is_on_field(player_id) {
            return Err(EngineError::AlreadyOnField(player_id.clone()));
        }
        if !self.availability.contains(player_id) {
            return Err(EngineError::NotAvailable(player_id.clone()));
        }
        if !self.flags.can_come_on(player_id, self.is_before_halftime()) {
            return Err(EngineError::PlayerHeld(player_id.clone()));
        }
        Ok(toggle_in(&mut self.selection.on, player_id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Подтвердить выбранный пакет замен на текущей отметке часов.
    pub fn confirm_batch(&mut self) -> Result<(SubstitutionBatch, Vec<StoreWrite>), EngineError> {
        self.require_status(MatchStatus::Live)?;
        let pairs = pair_selections(&self.selection.off, &self.selection.on)?;
        for pair in &pairs {
            if !self.availability.contains(&pair.on_id) {
                return Err(EngineError::NotAvailable(pair.on_id.clone()));
            }
        }

        let snapshot = self.capture();
        let at_ms = self.now_ms();
        let batch = apply_batch(&mut self.book, pairs, at_ms)?;
        self.history.push(snapshot);

        let mut writes: Vec<StoreWrite> = batch
            .closed
            .iter()
            .map(|closed| StoreWrite::CloseInterval {
                player_id: closed.player_id.clone(),
                end_ms: closed.end_ms.unwrap_or(closed.start_ms),
            })
            .collect();
        writes.extend(batch.on_ids().map(|pid| StoreWrite::OpenInterval {
            player_id: pid.clone(),
            start_ms: at_ms,
        }));
        writes.push(self.push_event(batch.to_event()?));

        self.selection.clear();
        info!(pairs = batch.pairs.len(), at_ms, "пакет замен подтверждён");

        Ok((batch, writes))
    }

    /// Ручной выпуск одного игрока на поле.
    pub fn send_on(&mut self, player_id: &PlayerId) -> Result<Vec<StoreWrite>, EngineError> {
        self.require_status(MatchStatus::Live)?;
        self.require_known(player_id)?;
        if !self.availability.contains(player_id) {
            return Err(EngineError::NotAvailable(player_id.clone()));
        }
        if !self.flags.can_come_on(player_id, self.is_before_halftime()) {
            return Err(EngineError::PlayerHeld(player_id.clone()));
        }
        let max = self.config.max_on_field as usize;
        if self.book.on_field_count() >= max {
            return Err(EngineError::FieldFull { max });
        }

        let snapshot = self.capture();
        let at_ms = self.now_ms();
        self.book.open_interval(player_id, at_ms)?;
        self.history.push(snapshot);
        self.selection.on.retain(|p| p != player_id);

        let event = MatchEvent::for_player(EventKind::SendOn, at_ms, player_id.clone());
        Ok(vec![
            StoreWrite::OpenInterval {
                player_id: player_id.clone(),
                start_ms: at_ms,
            },
            self.push_event(event),
        ])
    }

    /// Ручной уход одного игрока с поля.
    pub fn take_off(&mut self, player_id: &PlayerId) -> Result<Vec<StoreWrite>, EngineError> {
        self.require_status(MatchStatus::Live)?;
        self.require_known(player_id)?;
        if !self.flags.can_come_off(player_id, self.is_before_halftime()) {
            return Err(EngineError::PlayerLocked(player_id.clone()));
        }

        let snapshot = self.capture();
        let at_ms = self.now_ms();
        let closed = self.book.close_interval(player_id, at_ms)?;
        self.history.push(snapshot);
        self.selection.off.retain(|p| p != player_id);

        // в журнал уходит фактический конец (после прижатия)
        let end_ms = closed.end_ms.unwrap_or(closed.start_ms);
        let event = MatchEvent::for_player(EventKind::TakeOff, end_ms, player_id.clone());
        Ok(vec![
            StoreWrite::CloseInterval {
                player_id: player_id.clone(),
                end_ms,
            },
            self.push_event(event),
        ])
    }

    /// Отметка тренера: попытка, захват или заметка.
    pub fn record_event(
        &mut self,
        kind: EventKind,
        player_id: Option<&PlayerId>,
        note: Option<String>,
    ) -> Result<Vec<StoreWrite>, EngineError> {
        if !kind.is_quick_action() {
            return Err(EngineError::NotAQuickAction(kind));
        }
        if let Some(pid) = player_id {
            self.require_known(pid)?;
        }

        let mut event = MatchEvent::new(kind, self.now_ms());
        event.player_id = player_id.cloned();
        // заметка сохраняется только у OTHER
        if kind == EventKind::Other {
            event.note = note.filter(|n| !n.trim().is_empty());
        }

        Ok(vec![self.push_event(event)])
    }

    /// Финальный свисток.
    pub fn end_match(&mut self) -> Result<Vec<StoreWrite>, EngineError> {
        self.require_status(MatchStatus::Live)?;
        self.snapshot();
        self.clock.pause();

        let at_ms = self.now_ms();
        let mut writes: Vec<StoreWrite> = self
            .book
            .close_all(at_ms)
            .into_iter()
            .map(|closed| StoreWrite::CloseInterval {
                end_ms: closed.end_ms.unwrap_or(closed.start_ms),
                player_id: closed.player_id,
            })
            .collect();
        writes.push(self.push_event(MatchEvent::new(EventKind::FullTime, at_ms)));

        self.selection.clear();
        self.status = MatchStatus::Final;
        info!(match_id = self.match_id, at_ms, "матч завершён");

        Ok(writes)
    }

    /// Откат к предыдущему снимку. Только локально: хранилище не трогаем.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        let prev = self.history.pop().ok_or(EngineError::NothingToUndo)?;
        self.book = prev.book;
        self.availability = prev.availability;
        self.events = prev.events;
        self.clock.restore(prev.elapsed_ms);
        self.config.max_on_field = prev.max_on_field;
        self.status = prev.status;
        self.selection.clear();
        debug!(at_ms = prev.elapsed_ms, "откат к снимку");
        Ok(())
    }

    /// Полная замена локального вида данными из хранилища.
    ///
    /// Статус выводится из данных: есть `FULL_TIME` → Final, есть интервалы → Live,
    /// нет ни интервалов, ни событий → Draft.
    pub fn apply_refresh(
        &mut self,
        intervals: Vec<PlayingInterval>,
        events: Vec<MatchEvent>,
    ) -> Result<(), EngineError> {
        let book = IntervalBook::from_intervals(intervals)?;
        let availability = latest_availability(&events)?;

        self.book = book;
        self.events = events;
        if let Some(a) = availability {
            self.availability = a;
        }

        self.status = if self.events.iter().any(|e| e.kind == EventKind::FullTime) {
            MatchStatus::Final
        } else if !self.book.is_empty() {
            MatchStatus::Live
        } else if self.events.is_empty() {
            // матч сброшен на другом устройстве
            MatchStatus::Draft
        } else {
            self.status
        };

        let on_field = self.book.on_field_ids();
        self.selection.off.retain(|p| on_field.contains(p));
        self.selection.on.retain(|p| !on_field.contains(p));

        debug!(intervals = self.book.len(), events = self.events.len(), "обновление применено");
        Ok(())
    }

    /// Сброс матча: интервалы, журнал, часы и история очищаются.
    pub fn reset(&mut self) -> Vec<StoreWrite> {
        warn!(match_id = self.match_id, "сброс матча");
        self.book.clear();
        self.events.clear();
        self.history.clear();
        self.selection.clear();
        self.clock.reset();
        self.status = MatchStatus::Draft;
        vec![StoreWrite::ResetMatch]
    }

    // ---------------------------------------------------------------------
    // Внутреннее
    // ---------------------------------------------------------------------

    fn require_known(&self, player_id: &PlayerId) -> Result<(), EngineError> {
        if self.roster.contains(player_id) {
            Ok(())
        } else {
            Err(EngineError::UnknownPlayer(player_id.clone()))
        }
    }

    fn require_status(&self, expected: MatchStatus) -> Result<(), EngineError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidStatus {
                expected,
                actual: self.status,
            })
        }
    }

    fn capture(&self) -> SessionSnapshot {
        SessionSnapshot {
            book: self.book.clone(),
            availability: self.availability.clone(),
            events: self.events.clone(),
            elapsed_ms: self.clock.elapsed_ms(),
            max_on_field: self.config.max_on_field,
            status: self.status,
        }
    }

    fn snapshot(&mut self) {
        let snap = self.capture();
        self.history.push(snap);
    }

    fn push_event(&mut self, event: MatchEvent) -> StoreWrite {
        self.events.push(event.clone());
        StoreWrite::AppendEvent(event)
    }

    fn availability_snapshot(&mut self) -> Result<Vec<StoreWrite>, EngineError> {
        let ids = self.availability.to_vec();
        let event = MatchEvent::with_payload(EventKind::Availability, self.now_ms(), &ids)?;
        Ok(vec![self.push_event(event)])
    }
}

/// Добавить/убрать id из списка выбора. Возвращает true, если id теперь выбран.
fn toggle_in(list: &mut Vec<PlayerId>, player_id: &PlayerId) -> bool {
    if let Some(pos) = list.iter().position(|p| p == player_id) {
        list.remove(pos);
        false
    } else {
        list.push(player_id.clone());
        true
    }
}
