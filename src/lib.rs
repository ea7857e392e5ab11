//! Движок безлимитного холдема для автономных агентов.
//!
//! Слои:
//! - `domain` – карты, колода, агенты, столы, раздачи;
//! - `eval` – оценка рук;
//! - `engine` – ставки, улицы, сайд-поты, места, транзакции над хранилищем;
//! - `time_ctrl` – таймауты, автостарт и их планировщик;
//! - `infra` – id, RNG, хранилище;
//! - `api` – команды и read-проекции для внешнего транспорта.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
pub mod time_ctrl;

pub use config::EngineConfig;
pub use engine::{EngineError, TableManager};
pub use infra::InMemoryPokerStorage;
