//! Внешний API покерного движка.
//!
//! Здесь описываются:
//! - команды (commands.rs): всё, что меняет состояние (регистрация, места, действия);
//! - запросы (queries.rs): только чтение, с сокрытием чужих карт;
//! - DTO (dto.rs): структуры ответов для агентов;
//! - ошибки (errors.rs): то, что видит клиент.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
