//! Места за столом: посадка, уход, докупка, sit-out и сверка стеков
//! после раздачи. Все функции чистые: меняют переданные структуры,
//! запись в хранилище делает менеджер столов.

use tracing::{debug, info};

use crate::domain::agent::Agent;
use crate::domain::chips::Chips;
use crate::domain::hand::Hand;
use crate::domain::table::{SeatIndex, SeatOccupant, Table, TableStatus};
use crate::domain::{AgentId, Timestamp};
use crate::engine::errors::EngineError;

/// Посадить агента за стол, списав бай-ин с баланса.
///
/// Место можно указать явно, иначе берётся первое свободное.
/// Агент, ушедший из идущей раздачи, не может вернуться до её конца.
pub fn join(
    table: &mut Table,
    hand: Option<&Hand>,
    agent: &mut Agent,
    buy_in: Chips,
    seat: Option<SeatIndex>,
) -> Result<SeatIndex, EngineError> {
    let cfg = &table.config;
    if buy_in < cfg.min_buy_in || buy_in > cfg.max_buy_in {
        return Err(EngineError::BuyInOutOfRange {
            min: cfg.min_buy_in,
            max: cfg.max_buy_in,
            attempted: buy_in,
        });
    }
    if agent.balance < buy_in {
        return Err(EngineError::InsufficientBalance {
            balance: agent.balance,
            required: buy_in,
        });
    }
    if table.seat_of(agent.id).is_some() {
        return Err(EngineError::AlreadySeated(agent.id));
    }
    if hand.is_some_and(|h| !h.is_complete() && h.player(agent.id).is_some()) {
        return Err(EngineError::RejoinDuringHand);
    }

    let seat = match seat {
        Some(s) if s >= table.max_seats() => return Err(EngineError::InvalidSeat(s)),
        Some(s) if !table.is_seat_empty(s) => return Err(EngineError::SeatTaken(s)),
        Some(s) => s,
        None => table.first_empty_seat().ok_or(EngineError::TableFull)?,
    };

    agent
        .debit(buy_in)
        .ok_or(EngineError::InsufficientBalance {
            balance: agent.balance,
            required: buy_in,
        })?;
    table.seats[seat as usize] = Some(SeatOccupant::new(agent.id, buy_in));
    table.refresh_resting_status();

    info!(table_id = table.id, agent_id = agent.id, seat, buy_in = buy_in.0, "агент сел за стол");
    Ok(seat)
}

/// Встать из-за стола и вернуть стек на баланс.
///
/// Нельзя, пока агент держит живые карты в идущей раздаче. Сфолдивший
/// участник получает остаток стека внутри раздачи, его вклад остаётся в банке.
pub fn leave(table: &mut Table, hand: Option<&Hand>, agent: &mut Agent) -> Result<Chips, EngineError> {
    let seat = table.seat_of(agent.id).ok_or(EngineError::NotSeated(agent.id))?;

    let in_hand = hand
        .filter(|h| !h.is_complete())
        .and_then(|h| h.player(agent.id).filter(|p| p.seat_index == seat));
    let refund = match in_hand {
        Some(p) if !p.folded => return Err(EngineError::LeaveDuringHand),
        Some(p) => p.stack,
        None => table
            .occupant(seat)
            .map(|o| o.stack)
            .ok_or(EngineError::NotSeated(agent.id))?,
    };

    table.seats[seat as usize] = None;
    agent.credit(refund);
    table.refresh_resting_status();

    info!(table_id = table.id, agent_id = agent.id, refund = refund.0, "агент покинул стол");
    Ok(refund)
}

/// Докупить фишки в стек. Только между раздачами, не выше максимального бай-ина.
pub fn rebuy(
    table: &mut Table,
    hand_in_progress: bool,
    agent: &mut Agent,
    amount: Chips,
) -> Result<Chips, EngineError> {
    let seat = table.seat_of(agent.id).ok_or(EngineError::NotSeated(agent.id))?;
    if hand_in_progress || table.status == TableStatus::Playing {
        return Err(EngineError::RebuyDuringHand);
    }
    if amount.is_zero() {
        return Err(EngineError::RebuyAmountZero);
    }
    if agent.balance < amount {
        return Err(EngineError::InsufficientBalance {
            balance: agent.balance,
            required: amount,
        });
    }
    let max = table.config.max_buy_in;
    let occupant = table.occupant_mut(seat).ok_or(EngineError::NotSeated(agent.id))?;
    let new_stack = occupant.stack + amount;
    if new_stack > max {
        return Err(EngineError::RebuyExceedsMax { max });
    }

    agent
        .debit(amount)
        .ok_or(EngineError::InsufficientBalance {
            balance: agent.balance,
            required: amount,
        })?;
    occupant.stack = new_stack;
    table.refresh_resting_status();

    info!(table_id = table.id, agent_id = agent.id, amount = amount.0, "докупка");
    Ok(new_stack)
}

/// Переключить sit-out. Возвращение в игру обнуляет счётчик таймаутов.
/// Возвращает новое значение флага.
pub fn toggle_sit_out(table: &mut Table, agent_id: AgentId) -> Result<bool, EngineError> {
    let seat = table.seat_of(agent_id).ok_or(EngineError::NotSeated(agent_id))?;
    let occupant = table.occupant_mut(seat).ok_or(EngineError::NotSeated(agent_id))?;
    occupant.sitting_out = !occupant.sitting_out;
    if !occupant.sitting_out {
        occupant.consecutive_timeouts = 0;
    }
    let sitting_out = occupant.sitting_out;
    table.refresh_resting_status();

    debug!(table_id = table.id, agent_id, sitting_out, "sit-out переключён");
    Ok(sitting_out)
}

/// Сверка стеков после завершения раздачи:
/// `стек = стек_до_раздачи − вклад + выигрыш` для каждого, кто всё ещё
/// сидит на своём месте. Затем стол освобождается.
pub fn settle_after_hand(table: &mut Table, hand: &Hand, now: Timestamp) {
    for p in &hand.players {
        let won = hand.amount_won_by(p.agent_id);
        match table.occupant_mut(p.seat_index) {
            Some(o) if o.agent_id == p.agent_id => {
                o.stack = p.starting_stack.saturating_sub(p.total_bet) + won;
            }
            _ => debug!(
                table_id = table.id,
                agent_id = p.agent_id,
                "участник ушёл во время раздачи, стек не сверяется"
            ),
        }
    }

    if table.current_hand_id == Some(hand.id) {
        table.current_hand_id = None;
    }
    table.status = table.resting_status();
    table.last_hand_completed_at = Some(now);
}

/// Обновить статистику агента по итогам завершённой раздачи.
pub fn record_hand_stats(agent: &mut Agent, hand: &Hand) {
    if let Some(p) = hand.player(agent.id) {
        agent.stats.record_hand(p.total_bet, hand.amount_won_by(agent.id));
    }
}

/// Снять со стола агента, пропустившего слишком много ходов.
/// Только между раздачами. Возвращает сумму, ушедшую на баланс.
pub fn remove_unresponsive(
    table: &mut Table,
    agent: &mut Agent,
    max_consecutive_timeouts: u32,
) -> Result<Chips, EngineError> {
    if table.status == TableStatus::Playing || table.current_hand_id.is_some() {
        return Err(EngineError::HandAlreadyInProgress(table.id));
    }
    let seat = table.seat_of(agent.id).ok_or(EngineError::NotSeated(agent.id))?;
    let occupant = table.occupant(seat).ok_or(EngineError::NotSeated(agent.id))?;
    if !occupant.sitting_out || occupant.consecutive_timeouts < max_consecutive_timeouts {
        return Err(EngineError::IllegalAction);
    }
    let refund = occupant.stack;

    table.seats[seat as usize] = None;
    agent.credit(refund);
    table.refresh_resting_status();

    info!(table_id = table.id, agent_id = agent.id, refund = refund.0, "неотвечающий агент снят со стола");
    Ok(refund)
}
