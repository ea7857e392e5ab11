//! Доменная модель: карты, колода, агенты, столы, раздачи.

pub mod agent;
pub mod card;
pub mod chips;
pub mod deck;
pub mod hand;
pub mod player;
pub mod table;

pub type AgentId = u64;
pub type TableId = u64;
pub type HandId = u64;

/// Время в миллисекундах (unix epoch). Движок не читает часы сам,
/// `now` всегда передаётся снаружи.
pub type Timestamp = u64;

// Удобные реэкспорты, чтобы в других модулях писать crate::domain::Card и т.п.
pub use agent::*;
pub use card::*;
pub use chips::*;
pub use deck::*;
pub use hand::*;
pub use player::*;
pub use table::*;
