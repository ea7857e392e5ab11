//! Покерный движок: ставки, переход улиц, сайд-поты, шоудаун,
//! места за столом и транзакционная обвязка над хранилищем.
//!
//! Основные операции:
//!   - `start_hand` – запустить новую раздачу
//!   - `apply_action` – применить действие игрока (единственный путь изменения раздачи)
//!   - `TableManager` – те же операции поверх версионированного хранилища

pub mod actions;
pub mod betting;
pub mod errors;
pub mod game_loop;
pub mod hand_history;
pub mod positions;
pub mod recovery;
pub mod seating;
pub mod side_pots;
pub mod table_manager;
pub mod validation;

pub use actions::{ActionKind, ActionSource, PlayerAction};
pub use betting::{valid_actions, ValidAction};
pub use errors::EngineError;
pub use game_loop::{apply_action, force_runout, start_hand, start_hand_with_deck, HandStatus};
pub use hand_history::{ActionLog, ActionLogEntry};
pub use recovery::{RecoveryAction, RecoveryOutcome};
pub use side_pots::{award_pots, compute_side_pots, Contribution};
pub use table_manager::{timeout_action, TableManager};

/// RNG интерфейс для engine.
/// Реализации лежат в infra (`SystemRng`, `DeterministicRng`, `NoShuffle`).
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);
}
