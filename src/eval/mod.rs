//! Модуль оценки силы покерных рук (Texas Hold'em).
//!
//! Основные функции:
//!   `evaluate(cards) -> HandValue` (5..=7 карт),
//!   `compare(a, b) -> Ordering`.

pub mod evaluator;
pub mod hand_rank;
pub mod lookup_tables;

pub use evaluator::{evaluate, evaluate_best_hand, EvalError};
pub use hand_rank::{compare, HandCategory, HandValue};
