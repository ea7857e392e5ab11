use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::card::pretty_cards;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::hand::{Hand, LastAction, SidePot, Street, Turn, Winner};
use crate::domain::player::HandPlayer;
use crate::domain::table::{Table, TableStatus};
use crate::domain::{AgentId, HandId, SeatIndex, Timestamp};
use crate::engine::actions::{ActionKind, ActionSource, PlayerAction};
use crate::engine::betting::{amount_to_call, first_to_act_from, next_to_act};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::{ActionLog, ActionLogEntry};
use crate::engine::positions::{blind_positions, clockwise_from, next_dealer};
use crate::engine::seating::settle_after_hand;
use crate::engine::side_pots::{award_pots, compute_side_pots, Contribution};
use crate::engine::validation::{validate_action, Resolved};
use crate::engine::RandomSource;
use crate::eval::evaluate_best_hand;
use crate::time_ctrl::TimeRules;

/// Статус раздачи после операции.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    Ongoing,
    Finished,
}

/// Старт новой раздачи со свежей перетасованной колодой.
pub fn start_hand<R: RandomSource>(
    table: &mut Table,
    rng: &mut R,
    hand_id: HandId,
    now: Timestamp,
    rules: &TimeRules,
) -> Result<Hand, EngineError> {
    let deck = Deck::shuffled(rng);
    start_hand_with_deck(table, deck, hand_id, now, rules)
}

/// Старт раздачи с заданной колодой:
/// - проверяет, что стол свободен и не заморожен;
/// - двигает кнопку, раздаёт по две карты в порядке мест;
/// - постит блайнды и назначает первого ходящего.
///
/// Если после блайндов действовать некому (все в олл-ине), борд
/// докладывается сразу и раздача завершается внутри этого вызова.
pub fn start_hand_with_deck(
    table: &mut Table,
    mut deck: Deck,
    hand_id: HandId,
    now: Timestamp,
    rules: &TimeRules,
) -> Result<Hand, EngineError> {
    if let Some(reason) = &table.frozen_reason {
        return Err(EngineError::TableFrozen {
            table_id: table.id,
            reason: reason.clone(),
        });
    }
    if table.current_hand_id.is_some() || table.status == TableStatus::Playing {
        return Err(EngineError::HandAlreadyInProgress(table.id));
    }

    let eligible = table.eligible_seats();
    if eligible.len() < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }
    let button = next_dealer(&eligible, table.dealer_button).ok_or(EngineError::NotEnoughPlayers)?;
    let positions = blind_positions(&eligible, button).ok_or(EngineError::NotEnoughPlayers)?;

    let mut players = Vec::with_capacity(eligible.len());
    for &seat in &eligible {
        let occupant = table
            .occupant(seat)
            .ok_or_else(|| EngineError::Integrity(format!("место {seat} пусто при раздаче")))?;
        let hole = deck.draw_n(2);
        if hole.len() != 2 {
            return Err(EngineError::Integrity("в колоде не хватило карт".into()));
        }
        players.push(HandPlayer::new(occupant.agent_id, seat, occupant.stack, hole));
    }

    table.hands_dealt += 1;
    let mut hand = Hand {
        id: hand_id,
        table_id: table.id,
        hand_number: table.hands_dealt,
        street: Street::Preflop,
        deck,
        board: Vec::new(),
        pot: Chips::ZERO,
        side_pots: Vec::new(),
        current_bet: Chips::ZERO,
        last_full_raise: table.big_blind(),
        big_blind: table.big_blind(),
        turn: Turn::None,
        action_deadline: None,
        last_action: None,
        dealer_seat: button,
        players,
        winners: Vec::new(),
        reached_showdown: false,
        started_at: now,
        completed_at: None,
    };

    let sb_idx = index_of_seat(&hand, positions.small_blind)?;
    let bb_idx = index_of_seat(&hand, positions.big_blind)?;
    let sb_paid = hand.players[sb_idx].commit(table.small_blind());
    let bb_paid = hand.players[bb_idx].commit(table.big_blind());
    hand.pot = sb_paid + bb_paid;
    // Ставка к уравниванию – наибольший из блайндов: короткий BB может внести меньше SB.
    hand.current_bet = sb_paid.max(bb_paid);
    hand.last_full_raise = hand.current_bet;

    table.dealer_button = Some(button);
    table.status = TableStatus::Playing;
    table.current_hand_id = Some(hand_id);

    info!(
        table_id = table.id,
        hand_id,
        hand_number = hand.hand_number,
        button,
        players = hand.players.len(),
        "раздача началась"
    );

    let first_idx = index_of_seat(&hand, positions.first_to_act)?;
    match first_to_act_from(&hand, first_idx) {
        Some(idx) => set_turn(&mut hand, idx, now, rules),
        None => {
            advance_street(table, &mut hand, now, rules)?;
        }
    }

    Ok(hand)
}

/// Применить действие игрока. Единственная точка изменения раздачи
/// для игроков, sweeper-а и служебных проходов.
pub fn apply_action(
    table: &mut Table,
    hand: &mut Hand,
    action: &PlayerAction,
    now: Timestamp,
    rules: &TimeRules,
    log: &mut ActionLog,
) -> Result<HandStatus, EngineError> {
    if hand.is_complete() {
        return Err(EngineError::HandComplete);
    }
    let idx = hand
        .player_index(action.agent_id)
        .ok_or(EngineError::PlayerNotInHand(action.agent_id))?;
    if hand.turn != Turn::Player(idx) {
        return Err(EngineError::NotPlayersTurn(action.agent_id));
    }
    if action.source.checks_deadline() {
        if let Some(deadline) = hand.action_deadline {
            if now > deadline.saturating_add(rules.grace_ms) {
                return Err(EngineError::DeadlinePassed);
            }
        }
    }

    let resolved = validate_action(hand, &hand.players[idx], action)?;
    let street = hand.street;
    let paid = apply_resolved(hand, idx, resolved);
    hand.players[idx].has_acted = true;

    // В лог идёт то, что произошло: bet/raise на весь стек не выше ставки – это олл-ин коллом.
    let (logged_kind, logged_amount) = match (action.kind, resolved) {
        (ActionKind::Bet | ActionKind::Raise, Resolved::Call) => (ActionKind::AllIn, Some(paid)),
        (ActionKind::Bet | ActionKind::Raise, _) => (action.kind, action.amount),
        (ActionKind::Call | ActionKind::AllIn, _) => (action.kind, Some(paid)),
        (ActionKind::Fold | ActionKind::Check, _) => (action.kind, None),
    };
    hand.last_action = Some(LastAction {
        agent_id: action.agent_id,
        kind: logged_kind,
        amount: logged_amount,
        source: action.source,
        at: now,
    });
    log.push(ActionLogEntry {
        hand_id: hand.id,
        table_id: hand.table_id,
        agent_id: action.agent_id,
        street,
        kind: logged_kind,
        amount: logged_amount,
        source: action.source,
        at: now,
    });

    let seat = hand.players[idx].seat_index;
    track_timeouts(table, seat, action.agent_id, action.source, rules);

    debug!(
        table_id = hand.table_id,
        hand_id = hand.id,
        agent_id = action.agent_id,
        kind = %logged_kind,
        source = ?action.source,
        pot = hand.pot.0,
        "действие принято"
    );

    if hand.live_count() == 1 {
        award_uncontested(table, hand, now)?;
        return Ok(HandStatus::Finished);
    }

    match next_to_act(hand, idx) {
        Some(next) => {
            set_turn(hand, next, now, rules);
            Ok(HandStatus::Ongoing)
        }
        None => advance_street(table, hand, now, rules),
    }
}

/// Довести зависшую раздачу до конца: доложить борд и провести шоудаун
/// (или отдать банк единственному оставшемуся).
pub fn force_runout(table: &mut Table, hand: &mut Hand, now: Timestamp) -> Result<(), EngineError> {
    if hand.is_complete() {
        return Ok(());
    }
    if hand.live_count() <= 1 {
        return award_uncontested(table, hand, now);
    }
    loop {
        reset_street(hand);
        match hand.street.next() {
            Some(next) => deal_street(hand, next)?,
            None => return showdown(table, hand, now),
        }
    }
}

fn index_of_seat(hand: &Hand, seat: SeatIndex) -> Result<usize, EngineError> {
    hand.players
        .iter()
        .position(|p| p.seat_index == seat)
        .ok_or_else(|| EngineError::Integrity(format!("место {seat} не участвует в раздаче")))
}

fn set_turn(hand: &mut Hand, idx: usize, now: Timestamp, rules: &TimeRules) {
    hand.turn = Turn::Player(idx);
    hand.action_deadline = Some(now.saturating_add(rules.action_timeout_ms));
}

/// Переместить фишки согласно проверенному действию. Возвращает вложенное.
fn apply_resolved(hand: &mut Hand, idx: usize, resolved: Resolved) -> Chips {
    let current_bet = hand.current_bet;
    let to_call = amount_to_call(hand, &hand.players[idx]);
    let player = &mut hand.players[idx];

    let paid = match resolved {
        Resolved::Fold => {
            player.folded = true;
            Chips::ZERO
        }
        Resolved::Check => Chips::ZERO,
        Resolved::Call => player.commit(to_call),
        Resolved::RaiseTo(total) => {
            let paid = player.commit(total - player.current_bet);
            // Неполный олл-ин рейз не меняет минимальный шаг.
            let raise_size = total - current_bet;
            if raise_size >= hand.last_full_raise {
                hand.last_full_raise = raise_size;
            }
            hand.current_bet = total;
            paid
        }
    };
    hand.pot += paid;
    paid
}

fn track_timeouts(
    table: &mut Table,
    seat: SeatIndex,
    agent_id: AgentId,
    source: ActionSource,
    rules: &TimeRules,
) {
    let Some(occupant) = table.occupant_mut(seat) else {
        return;
    };
    if occupant.agent_id != agent_id {
        return;
    }
    match source {
        ActionSource::Player => occupant.consecutive_timeouts = 0,
        ActionSource::Timeout => {
            occupant.consecutive_timeouts += 1;
            if occupant.consecutive_timeouts >= rules.max_consecutive_timeouts && !occupant.sitting_out {
                occupant.sitting_out = true;
                info!(
                    table_id = table.id,
                    agent_id,
                    "агент пропустил несколько ходов подряд и пересажен в sit-out"
                );
            }
        }
        ActionSource::System => {}
    }
}

fn reset_street(hand: &mut Hand) {
    for p in hand.players.iter_mut() {
        p.current_bet = Chips::ZERO;
        p.has_acted = false;
    }
    hand.current_bet = Chips::ZERO;
    hand.last_full_raise = hand.big_blind;
    hand.turn = Turn::None;
    hand.action_deadline = None;
}

fn deal_street(hand: &mut Hand, street: Street) -> Result<(), EngineError> {
    let count = street.cards_revealed();
    let cards = hand.deck.draw_n(count);
    if cards.len() != count {
        return Err(EngineError::Integrity("в колоде не хватило карт".into()));
    }
    hand.board.extend(cards);
    hand.street = street;
    Ok(())
}

/// Улица закрыта: сброс ставок, следующая порция борда, первый ходящий
/// слева от кнопки. Если действовать могут меньше двух игроков,
/// борд докладывается до конца и проводится шоудаун.
fn advance_street(
    table: &mut Table,
    hand: &mut Hand,
    now: Timestamp,
    rules: &TimeRules,
) -> Result<HandStatus, EngineError> {
    loop {
        reset_street(hand);
        let Some(next) = hand.street.next() else {
            showdown(table, hand, now)?;
            return Ok(HandStatus::Finished);
        };
        deal_street(hand, next)?;
        debug!(
            table_id = hand.table_id,
            hand_id = hand.id,
            street = ?next,
            board = %pretty_cards(&hand.board),
            "новая улица"
        );

        if hand.actionable_count() >= 2 {
            let start = hand
                .players
                .iter()
                .position(|p| p.seat_index > hand.dealer_seat)
                .unwrap_or(0);
            if let Some(idx) = first_to_act_from(hand, start) {
                set_turn(hand, idx, now, rules);
                return Ok(HandStatus::Ongoing);
            }
        }
    }
}

/// Остался один не сфолдивший: он забирает весь банк без вскрытия.
fn award_uncontested(table: &mut Table, hand: &mut Hand, now: Timestamp) -> Result<(), EngineError> {
    let winner = hand
        .players
        .iter()
        .find(|p| p.is_live())
        .ok_or_else(|| EngineError::Integrity("в раздаче не осталось игроков".into()))?;

    let amount = hand.pot;
    let winners = vec![Winner {
        agent_id: winner.agent_id,
        seat_index: winner.seat_index,
        amount,
        hand_description: "Others folded".into(),
    }];
    hand.side_pots = vec![SidePot {
        amount,
        eligible: vec![winner.agent_id],
    }];
    finish_hand(table, hand, winners, now);
    Ok(())
}

/// Вскрытие: оценка рук, банки, раздача выигрыша.
fn showdown(table: &mut Table, hand: &mut Hand, now: Timestamp) -> Result<(), EngineError> {
    let mut values = HashMap::new();
    for p in hand.players.iter().filter(|p| p.is_live()) {
        let value = evaluate_best_hand(&p.hole_cards, &hand.board)
            .map_err(|e| EngineError::Integrity(e.to_string()))?;
        values.insert(p.agent_id, value);
    }

    let contributions: Vec<Contribution> = hand
        .players
        .iter()
        .map(|p| Contribution {
            agent_id: p.agent_id,
            seat: p.seat_index,
            total_bet: p.total_bet,
            folded: p.folded,
        })
        .collect();
    let pots = compute_side_pots(&contributions)?;
    let pots_total: Chips = pots.iter().map(|p| p.amount).sum();
    if pots_total != hand.pot {
        return Err(EngineError::Integrity(format!(
            "сумма банков {pots_total} не совпадает с банком {}",
            hand.pot
        )));
    }

    let seats: Vec<SeatIndex> = hand.players.iter().map(|p| p.seat_index).collect();
    let order: Vec<AgentId> = clockwise_from(&seats, hand.dealer_seat)
        .into_iter()
        .filter_map(|s| hand.players.iter().find(|p| p.seat_index == s))
        .map(|p| p.agent_id)
        .collect();
    let awards = award_pots(&pots, &values, &order)?;

    let mut winners = Vec::with_capacity(awards.len());
    for (agent_id, amount) in awards {
        if amount.is_zero() {
            continue;
        }
        let (Some(player), Some(value)) = (hand.player(agent_id), values.get(&agent_id)) else {
            return Err(EngineError::Integrity(format!("победитель {agent_id} не найден")));
        };
        winners.push(Winner {
            agent_id,
            seat_index: player.seat_index,
            amount,
            hand_description: format!("{} ({})", value.name(), pretty_cards(&player.hole_cards)),
        });
    }

    hand.side_pots = pots;
    hand.reached_showdown = true;
    finish_hand(table, hand, winners, now);
    Ok(())
}

fn finish_hand(table: &mut Table, hand: &mut Hand, winners: Vec<Winner>, now: Timestamp) {
    hand.street = Street::Complete;
    hand.turn = Turn::None;
    hand.action_deadline = None;
    hand.completed_at = Some(now);
    hand.winners = winners;

    settle_after_hand(table, hand, now);

    info!(
        table_id = hand.table_id,
        hand_id = hand.id,
        pot = hand.pot.0,
        showdown = hand.reached_showdown,
        winners = hand.winners.len(),
        "раздача завершена"
    );
}
