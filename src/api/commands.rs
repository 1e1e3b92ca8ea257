use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{EventKind, Millis, PlayerId, SubPair};
use crate::engine::{MatchSession, StoreWrite};

use super::errors::ApiError;

/// Команды экрана матча: всё, что меняет сессию.
///
/// Каждая команда превращается ровно в одну операцию `MatchSession`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Отметить игрока пришедшим/отсутствующим.
    SetAvailable { player_id: PlayerId, present: bool },

    /// Закрепить игрока на поле до перерыва.
    SetLockUntilHalftime { player_id: PlayerId, locked: bool },

    /// Придержать игрока на скамейке до перерыва.
    SetHoldForHalftime { player_id: PlayerId, held: bool },

    /// Поменять формат (сколько на поле).
    SetMaxOnField { max_on_field: u32 },

    /// Выпустить стартовый состав. Без списка берётся состав по умолчанию.
    StartMatch {
        #[serde(default)]
        starters: Option<Vec<PlayerId>>,
    },

    /// Старт/пауза часов.
    ToggleClock,

    /// Прибавить время к идущим часам.
    AdvanceClock { delta_ms: Millis },

    /// Кадр хоста с монотонной отметкой.
    Frame { frame_ms: Millis },

    /// Подсказка ротации: заполнить выбор.
    SuggestRotation,

    ToggleOffSelection { player_id: PlayerId },

    ToggleOnSelection { player_id: PlayerId },

    ClearSelection,

    /// Подтвердить выбранный пакет замен.
    ConfirmBatch,

    SendOn { player_id: PlayerId },

    TakeOff { player_id: PlayerId },

    /// Отметка тренера: TRY / TACKLE / OTHER.
    RecordEvent {
        kind: EventKind,
        #[serde(default)]
        player_id: Option<PlayerId>,
        #[serde(default)]
        note: Option<String>,
    },

    /// Финальный свисток.
    EndMatch,

    Undo,

    /// Сбросить матч целиком.
    Reset,
}

/// Ответ API на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    /// Успешный результат без доп.данных.
    Ok,

    /// Записи, которые надо отправить в хранилище.
    Writes(Vec<StoreWrite>),

    /// Подсказка ротации (уже лежит в выборе).
    Suggestion(Vec<SubPair>),

    /// Подтверждённый пакет замен и его записи.
    Batch {
        pairs: Vec<SubPair>,
        writes: Vec<StoreWrite>,
    },

    /// Новое состояние отметки игрока в выборе.
    Selected { player_id: PlayerId, selected: bool },

    ClockToggled { running: bool },

    /// Текущая отметка часов после тика.
    Clock { elapsed_ms: Millis },
}

impl CommandResponse {
    /// Записи для хранилища, если команда их породила.
    pub fn writes(&self) -> &[StoreWrite] {
        match self {
            CommandResponse::Writes(w) | CommandResponse::Batch { writes: w, .. } => w,
            _ => &[],
        }
    }
}

/// Выполнить команду над сессией.
pub fn handle_command(
    session: &mut MatchSession,
    command: ConsoleCommand,
) -> Result<CommandResponse, ApiError> {
    debug!(?command, "команда экрана матча");

    let response = match command {
        ConsoleCommand::SetAvailable { player_id, present } => {
            CommandResponse::Writes(session.set_available(&player_id, present)?)
        }
        ConsoleCommand::SetLockUntilHalftime { player_id, locked } => {
            session.set_lock_until_halftime(&player_id, locked)?;
            CommandResponse::Ok
        }
        ConsoleCommand::SetHoldForHalftime { player_id, held } => {
            session.set_hold_for_halftime(&player_id, held)?;
            CommandResponse::Ok
        }
        ConsoleCommand::SetMaxOnField { max_on_field } => {
            session.set_max_on_field(max_on_field)?;
            CommandResponse::Ok
        }
        ConsoleCommand::StartMatch { starters } => {
            let starters = starters.unwrap_or_else(|| session.default_starters());
            CommandResponse::Writes(session.start_match(&starters)?)
        }
        ConsoleCommand::ToggleClock => CommandResponse::ClockToggled {
            running: session.toggle_clock(),
        },
        ConsoleCommand::AdvanceClock { delta_ms } => CommandResponse::Clock {
            elapsed_ms: session.advance(delta_ms),
        },
        ConsoleCommand::Frame { frame_ms } => CommandResponse::Clock {
            elapsed_ms: session.on_frame(frame_ms),
        },
        ConsoleCommand::SuggestRotation => CommandResponse::Suggestion(session.suggest_rotation()),
        ConsoleCommand::ToggleOffSelection { player_id } => {
            let selected = session.toggle_off_selection(&player_id)?;
            CommandResponse::Selected { player_id, selected }
        }
        ConsoleCommand::ToggleOnSelection { player_id } => {
            let selected = session.toggle_on_selection(&player_id)?;
            CommandResponse::Selected { player_id, selected }
        }
        ConsoleCommand::ClearSelection => {
            session.clear_selection();
            CommandResponse::Ok
        }
        ConsoleCommand::ConfirmBatch => {
            let (batch, writes) = session.confirm_batch()?;
            CommandResponse::Batch {
                pairs: batch.pairs,
                writes,
            }
        }
        ConsoleCommand::SendOn { player_id } => CommandResponse::Writes(session.send_on(&player_id)?),
        ConsoleCommand::TakeOff { player_id } => {
            CommandResponse::Writes(session.take_off(&player_id)?)
        }
        ConsoleCommand::RecordEvent {
            kind,
            player_id,
            note,
        } => CommandResponse::Writes(session.record_event(kind, player_id.as_ref(), note)?),
        ConsoleCommand::EndMatch => CommandResponse::Writes(session.end_match()?),
        ConsoleCommand::Undo => {
            session.undo()?;
            CommandResponse::Ok
        }
        ConsoleCommand::Reset => CommandResponse::Writes(session.reset()),
    };

    Ok(response)
}

/// Разобрать команду из JSON и выполнить её.
pub fn handle_json_command(session: &mut MatchSession, raw: &str) -> Result<CommandResponse, ApiError> {
    let command: ConsoleCommand = serde_json::from_str(raw)?;
    handle_command(session, command)
}
