use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::table::SeatIndex;
use crate::domain::AgentId;

/// Участник конкретной раздачи.
///
/// `stack` уменьшается по мере ставок; `starting_stack` фиксируется при раздаче
/// и нужен для сверки стека после завершения.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandPlayer {
    pub agent_id: AgentId,
    pub seat_index: SeatIndex,
    /// Карманные карты (ровно 2 для холдема).
    pub hole_cards: Vec<Card>,
    pub starting_stack: Chips,
    /// Остаток стека внутри раздачи.
    pub stack: Chips,
    /// Ставка на текущей улице.
    pub current_bet: Chips,
    /// Вклад в банк за всю раздачу.
    pub total_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    /// Действовал ли игрок на текущей улице.
    pub has_acted: bool,
}

impl HandPlayer {
    pub fn new(agent_id: AgentId, seat_index: SeatIndex, stack: Chips, hole_cards: Vec<Card>) -> Self {
        Self {
            agent_id,
            seat_index,
            hole_cards,
            starting_stack: stack,
            stack,
            current_bet: Chips::ZERO,
            total_bet: Chips::ZERO,
            folded: false,
            all_in: false,
            has_acted: false,
        }
    }

    /// Может ли игрок ещё принимать решения.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    /// Претендует ли игрок на банк.
    pub fn is_live(&self) -> bool {
        !self.folded
    }

    /// Максимальная сумма, до которой игрок может довести ставку на улице.
    pub fn max_total_bet(&self) -> Chips {
        self.stack + self.current_bet
    }

    /// Перенести до `amount` фишек из стека в ставку. Возвращает реально вложенное.
    /// Обнулившийся стек переводит игрока в олл-ин.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.current_bet += paid;
        self.total_bet += paid;
        if self.stack.is_zero() {
            self.all_in = true;
        }
        paid
    }
}
