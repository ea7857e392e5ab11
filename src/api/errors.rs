use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineError;

/// Ошибки внешнего API (то, что видит агент).
///
/// Отказы движка передаются дословно, текстом `EngineError`.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ApiError {
    /// Неправильные входные данные.
    #[error("{0}")]
    BadRequest(String),

    /// Стол, раздача или агент не найдены.
    #[error("{0}")]
    NotFound(String),

    /// Движок отказал: не твой ход, нелегальное действие, суммы, места.
    #[error("{0}")]
    Rejected(String),

    /// Гонка с другим запросом; можно повторить.
    #[error("{0}")]
    Conflict(String),

    /// Стол заморожен или нарушена целостность.
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let msg = err.to_string();
        match err {
            EngineError::TableNotFound(_) | EngineError::HandNotFound(_) | EngineError::AgentNotFound(_) => {
                ApiError::NotFound(msg)
            }
            EngineError::InvalidAgentName(_) | EngineError::InvalidTableConfig(_) | EngineError::AmountRequired => {
                ApiError::BadRequest(msg)
            }
            EngineError::Storage(_) => ApiError::Internal(msg),
            e if e.is_conflict() => ApiError::Conflict(msg),
            e if e.is_integrity() => ApiError::Unavailable(msg),
            _ => ApiError::Rejected(msg),
        }
    }
}
