use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::player::HandPlayer;
use crate::engine::actions::{ActionKind, PlayerAction};
use crate::engine::betting::{amount_to_call, min_raise_to};
use crate::engine::errors::EngineError;

/// Что действие означает в фишках после проверки.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolved {
    Fold,
    Check,
    /// Уравнять (возможно, на весь остаток стека).
    Call,
    /// Довести свою ставку на улице до указанной суммы.
    RaiseTo(Chips),
}

/// Проверка, может ли игрок выполнить это действие при текущем состоянии ставок.
///
/// bet и raise обрабатываются одинаково: сумма – итоговая ставка на улице.
/// Сумма, равная всему стеку, считается олл-ином и может быть меньше минимального рейза.
pub fn validate_action(
    hand: &Hand,
    player: &HandPlayer,
    action: &PlayerAction,
) -> Result<Resolved, EngineError> {
    if !player.can_act() {
        return Err(EngineError::IllegalAction);
    }

    let to_call = amount_to_call(hand, player);
    let all_in_to = player.max_total_bet();

    match action.kind {
        ActionKind::Fold => Ok(Resolved::Fold),

        ActionKind::Check => {
            if player.current_bet == hand.current_bet {
                Ok(Resolved::Check)
            } else {
                Err(EngineError::CannotCheck { to_call })
            }
        }

        ActionKind::Call => {
            if to_call.is_zero() {
                Err(EngineError::CannotCall)
            } else {
                Ok(Resolved::Call)
            }
        }

        ActionKind::Bet | ActionKind::Raise => {
            let amount = action.amount.ok_or(EngineError::AmountRequired)?;
            if amount > all_in_to {
                return Err(EngineError::InsufficientFunds {
                    available: all_in_to,
                    required: amount,
                });
            }
            if amount == all_in_to {
                return Ok(resolve_all_in(hand, player));
            }
            let min_to = min_raise_to(hand);
            if amount < min_to {
                return Err(EngineError::RaiseTooSmall {
                    min_raise_to: min_to,
                    attempted: amount,
                });
            }
            Ok(Resolved::RaiseTo(amount))
        }

        ActionKind::AllIn => {
            if player.stack.is_zero() {
                return Err(EngineError::IllegalAction);
            }
            Ok(resolve_all_in(hand, player))
        }
    }
}

/// Весь стек: либо рейз (возможно, неполный), либо колл на остаток.
fn resolve_all_in(hand: &Hand, player: &HandPlayer) -> Resolved {
    let total = player.max_total_bet();
    if total > hand.current_bet {
        Resolved::RaiseTo(total)
    } else {
        Resolved::Call
    }
}
