//! Проверка согласованности стола и его раздачи.
//!
//! `diagnose` ничего не меняет: она только решает, что делать.
//! Применяет решение менеджер столов (`TableManager::reconcile_table`).

use serde::{Deserialize, Serialize};

use crate::domain::hand::{Hand, Turn};
use crate::domain::table::{Table, TableStatus};

/// Что нужно сделать со столом.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Всё согласовано.
    Nothing,
    /// Раздачи нет, но статус не соответствует числу готовых игроков.
    RepairStatus(TableStatus),
    /// Стол ссылается на раздачу, которой нет в хранилище.
    ClearMissingHand,
    /// Раздача завершена, а стол всё ещё на неё ссылается; стеки проверены.
    ResettleCompleteHand,
    /// Раздача не завершена, но ходить некому.
    ForceRunout,
    /// Безопасно исправить нельзя.
    Freeze(String),
}

/// Итог прохода восстановления по одному столу.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryOutcome {
    Healthy,
    StatusRepaired,
    ClearedMissingHand,
    ResettledCompleteHand,
    ForcedRunout,
    Frozen(String),
    AlreadyFrozen,
}

pub fn diagnose(table: &Table, hand: Option<&Hand>) -> RecoveryAction {
    let Some(hand_id) = table.current_hand_id else {
        let resting = table.resting_status();
        return if table.status != resting {
            RecoveryAction::RepairStatus(resting)
        } else {
            RecoveryAction::Nothing
        };
    };

    let Some(hand) = hand.filter(|h| h.id == hand_id) else {
        return RecoveryAction::ClearMissingHand;
    };

    if hand.is_complete() {
        return if stacks_verify(table, hand) {
            RecoveryAction::ResettleCompleteHand
        } else {
            RecoveryAction::Freeze(format!(
                "стеки не сходятся с итогом завершённой раздачи {}",
                hand.id
            ))
        };
    }

    let seat_lost = hand.players.iter().any(|p| {
        p.is_live()
            && table
                .occupant(p.seat_index)
                .map_or(true, |o| o.agent_id != p.agent_id)
    });
    if seat_lost {
        return RecoveryAction::Freeze(format!(
            "участник раздачи {} исчез со своего места",
            hand.id
        ));
    }

    let stuck = match hand.turn {
        Turn::None => true,
        Turn::Player(i) => hand.players.get(i).map_or(true, |p| !p.can_act()),
    };
    if stuck {
        return RecoveryAction::ForceRunout;
    }

    if table.status != TableStatus::Playing {
        return RecoveryAction::RepairStatus(TableStatus::Playing);
    }
    RecoveryAction::Nothing
}

/// Стек каждого оставшегося участника равен либо стеку до раздачи
/// (сверка ещё не применялась), либо ожидаемому итогу (уже применялась).
fn stacks_verify(table: &Table, hand: &Hand) -> bool {
    hand.players.iter().all(|p| match table.occupant(p.seat_index) {
        Some(o) if o.agent_id == p.agent_id => {
            let settled = p.starting_stack.saturating_sub(p.total_bet) + hand.amount_won_by(p.agent_id);
            o.stack == p.starting_stack || o.stack == settled
        }
        _ => true,
    })
}
