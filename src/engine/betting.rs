use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::player::HandPlayer;
use crate::engine::actions::ActionKind;

/// Сколько игроку нужно добавить, чтобы уравнять ставку улицы.
pub fn amount_to_call(hand: &Hand, player: &HandPlayer) -> Chips {
    hand.current_bet.saturating_sub(player.current_bet)
}

/// Минимальная итоговая ставка для полноценного bet/raise.
pub fn min_raise_to(hand: &Hand) -> Chips {
    hand.current_bet + hand.last_full_raise
}

/// Нужно ли игроку ещё действовать на этой улице.
pub fn needs_to_act(hand: &Hand, player: &HandPlayer) -> bool {
    player.can_act() && (!player.has_acted || player.current_bet < hand.current_bet)
}

/// Следующий, кому ходить, после игрока с индексом `after` (по кругу).
/// None – улица закрыта.
pub fn next_to_act(hand: &Hand, after: usize) -> Option<usize> {
    let n = hand.players.len();
    (1..=n)
        .map(|step| (after + step) % n)
        .find(|&i| needs_to_act(hand, &hand.players[i]))
}

/// Первый, кому ходить, начиная с индекса `from` включительно.
pub fn first_to_act_from(hand: &Hand, from: usize) -> Option<usize> {
    let n = hand.players.len();
    (0..n)
        .map(|step| (from + step) % n)
        .find(|&i| needs_to_act(hand, &hand.players[i]))
}

/// Доступное действие с границами суммы (для bet/raise).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidAction {
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Chips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Chips>,
}

impl ValidAction {
    fn plain(kind: ActionKind) -> Self {
        Self {
            kind,
            min_amount: None,
            max_amount: None,
        }
    }
}

/// Список действий, доступных игроку `idx`, если сейчас его ход.
pub fn valid_actions(hand: &Hand, idx: usize) -> Vec<ValidAction> {
    let Some(player) = hand.players.get(idx) else {
        return Vec::new();
    };
    if hand.is_complete() || hand.turn.index() != Some(idx) || !player.can_act() {
        return Vec::new();
    }

    let to_call = amount_to_call(hand, player);
    let mut actions = vec![ValidAction::plain(ActionKind::Fold)];

    if player.current_bet == hand.current_bet {
        actions.push(ValidAction::plain(ActionKind::Check));
    }
    if !to_call.is_zero() && to_call <= player.stack {
        actions.push(ValidAction {
            kind: ActionKind::Call,
            min_amount: Some(to_call),
            max_amount: Some(to_call),
        });
    }
    if player.stack > to_call {
        let max_to = player.max_total_bet();
        let kind = if hand.current_bet.is_zero() {
            ActionKind::Bet
        } else {
            ActionKind::Raise
        };
        actions.push(ValidAction {
            kind,
            min_amount: Some(min_raise_to(hand).min(max_to)),
            max_amount: Some(max_to),
        });
    }
    if !player.stack.is_zero() {
        actions.push(ValidAction {
            kind: ActionKind::AllIn,
            min_amount: Some(player.stack),
            max_amount: Some(player.stack),
        });
    }
    actions
}
