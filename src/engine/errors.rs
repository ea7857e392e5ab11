use thiserror::Error;

use crate::domain::{AgentId, Chips, HandId, SeatIndex, TableId};
use crate::infra::persistence::StorageError;

/// Ошибки движка покера.
///
/// Три группы:
///   - валидация (ход не того игрока, нелегальное действие, суммы, места);
///   - конфликты конкурентного доступа (`is_conflict`);
///   - нарушения целостности (`is_integrity`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error("Раздача {0} не найдена")]
    HandNotFound(HandId),

    #[error("Агент {0} не найден")]
    AgentNotFound(AgentId),

    #[error("Имя агента уже занято: {0}")]
    AgentNameTaken(String),

    #[error("Некорректное имя агента: {0}")]
    InvalidAgentName(String),

    #[error("Некорректная конфигурация стола: {0}")]
    InvalidTableConfig(String),

    #[error("Недостаточно активных игроков для раздачи")]
    NotEnoughPlayers,

    #[error("Раздача уже завершена")]
    HandComplete,

    #[error("Раздача не активна")]
    NoActiveHand,

    #[error("Сейчас не ход игрока с id={0}")]
    NotPlayersTurn(AgentId),

    #[error("Игрок {0} не участвует в раздаче")]
    PlayerNotInHand(AgentId),

    #[error("Время на ход истекло")]
    DeadlinePassed,

    #[error("Время на ход ещё не истекло")]
    DeadlineNotReached,

    #[error("Невозможно выполнить check – нужно уравнять {to_call}")]
    CannotCheck { to_call: Chips },

    #[error("Невозможно выполнить call – нет ставки для уравнивания")]
    CannotCall,

    #[error("Для bet/raise нужна сумма")]
    AmountRequired,

    #[error("Размер рейза слишком мал: минимум до {min_raise_to}, указано {attempted}")]
    RaiseTooSmall { min_raise_to: Chips, attempted: Chips },

    #[error("Недостаточно фишек: доступно {available}, нужно {required}")]
    InsufficientFunds { available: Chips, required: Chips },

    #[error("Недопустимое действие в текущем состоянии раздачи")]
    IllegalAction,

    #[error("Бай-ин {attempted} вне диапазона {min}..{max}")]
    BuyInOutOfRange { min: Chips, max: Chips, attempted: Chips },

    #[error("Недостаточно средств на балансе: {balance}, нужно {required}")]
    InsufficientBalance { balance: Chips, required: Chips },

    #[error("Агент {0} уже сидит за этим столом")]
    AlreadySeated(AgentId),

    #[error("Место {0} не существует за столом")]
    InvalidSeat(SeatIndex),

    #[error("Место {0} занято")]
    SeatTaken(SeatIndex),

    #[error("Свободных мест нет")]
    TableFull,

    #[error("Агент {0} не сидит за этим столом")]
    NotSeated(AgentId),

    #[error("Нельзя покинуть стол, пока участвуешь в раздаче")]
    LeaveDuringHand,

    #[error("Вернуться за стол можно только после окончания текущей раздачи")]
    RejoinDuringHand,

    #[error("Докупка невозможна во время раздачи")]
    RebuyDuringHand,

    #[error("Сумма докупки должна быть положительной")]
    RebuyAmountZero,

    #[error("После докупки стек превысит максимум {max}")]
    RebuyExceedsMax { max: Chips },

    // --- конфликты ---
    #[error("На столе {0} уже идёт раздача")]
    HandAlreadyInProgress(TableId),

    #[error("Конфликт одновременной записи: {0}")]
    Conflict(String),

    // --- целостность ---
    #[error("Стол {table_id} заморожен: {reason}")]
    TableFrozen { table_id: TableId, reason: String },

    #[error("Нарушена целостность: {0}")]
    Integrity(String),

    #[error("Ошибка хранилища: {0}")]
    Storage(String),
}

impl EngineError {
    /// Ожидаемый результат гонки: фоновые проходы такие ошибки не поднимают наверх.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::HandAlreadyInProgress(_) | EngineError::Conflict(_)
        )
    }

    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            EngineError::TableFrozen { .. } | EngineError::Integrity(_)
        )
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::VersionConflict { .. } => EngineError::Conflict(e.to_string()),
            StorageError::DuplicateAgentName(name) => EngineError::AgentNameTaken(name),
            other => EngineError::Storage(other.to_string()),
        }
    }
}
