//! Сценарии чистого движка (без хранилища).
//!
//! Здесь мы проверяем:
//! - хедз-ап: кнопка = SB, порядок ходов префлоп/постфлоп;
//! - минимальный рейз и неполный олл-ин;
//! - закрытие улицы и переход на флоп;
//! - сайд-поты в полной раздаче с тремя олл-инами;
//! - дедлайн хода и grace-окно;
//! - счётчик таймаутов и sit-out;
//! - поворот кнопки между раздачами.

use agent_holdem::domain::card::Card;
use agent_holdem::domain::chips::Chips;
use agent_holdem::domain::deck::Deck;
use agent_holdem::domain::hand::{Hand, Street, Turn};
use agent_holdem::domain::table::{SeatOccupant, Table, TableConfig, TableStatus};
use agent_holdem::engine::{
    apply_action, start_hand_with_deck, valid_actions, ActionKind, ActionLog, ActionSource,
    EngineError, HandStatus, PlayerAction, ValidAction,
};
use agent_holdem::time_ctrl::TimeRules;

const START: u64 = 1_000;

/// Стол с агентами 1..=n на местах 0..n-1.
fn table_with(stacks: &[u64], sb: u64, bb: u64) -> Table {
    let mut table = Table::new(1, "test".into(), TableConfig::new(6, sb, bb, 1, 100_000), 0);
    for (i, &stack) in stacks.iter().enumerate() {
        table.seats[i] = Some(SeatOccupant::new(i as u64 + 1, Chips(stack)));
    }
    table
}

fn deal(table: &mut Table, hand_id: u64) -> Hand {
    start_hand_with_deck(table, Deck::standard_52(), hand_id, START, &TimeRules::standard())
        .expect("раздача должна начаться")
}

fn act(table: &mut Table, hand: &mut Hand, action: PlayerAction) -> Result<HandStatus, EngineError> {
    let mut log = ActionLog::new();
    apply_action(table, hand, &action, START + 100, &TimeRules::standard(), &mut log)
}

fn stack_of(table: &Table, agent_id: u64) -> Chips {
    let seat = table.seat_of(agent_id).expect("агент сидит");
    table.occupant(seat).expect("место занято").stack
}

//
// ====================== ХЕДЗ-АП ======================
//

#[test]
fn heads_up_button_posts_small_blind_and_acts_first() {
    let mut table = table_with(&[100, 100], 1, 2);
    let hand = deal(&mut table, 1);

    assert_eq!(hand.dealer_seat, 0);
    assert_eq!(hand.players[0].current_bet, Chips(1));
    assert_eq!(hand.players[1].current_bet, Chips(2));
    assert_eq!(hand.pot, Chips(3));
    assert_eq!(hand.turn, Turn::Player(0));
    assert_eq!(hand.action_deadline, Some(START + 30_000));
    assert_eq!(table.status, TableStatus::Playing);
    assert_eq!(table.current_hand_id, Some(1));
    // Стеки стола не трогаются до расчёта.
    assert_eq!(stack_of(&table, 1), Chips(100));
}

#[test]
fn heads_up_big_blind_acts_first_after_flop() {
    let mut table = table_with(&[100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);

    assert_eq!(act(&mut table, &mut hand, PlayerAction::call(1)), Ok(HandStatus::Ongoing));
    assert_eq!(hand.turn, Turn::Player(1));
    assert_eq!(act(&mut table, &mut hand, PlayerAction::check(2)), Ok(HandStatus::Ongoing));

    assert_eq!(hand.street, Street::Flop);
    assert_eq!(hand.board.len(), 3);
    assert_eq!(hand.current_bet, Chips::ZERO);
    assert_eq!(hand.pot, Chips(4));
    assert_eq!(hand.turn, Turn::Player(1));
}

#[test]
fn fold_awards_pot_and_settles_stacks() {
    let mut table = table_with(&[100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);

    act(&mut table, &mut hand, PlayerAction::call(1)).unwrap();
    act(&mut table, &mut hand, PlayerAction::check(2)).unwrap();
    act(&mut table, &mut hand, PlayerAction::bet(2, 10)).unwrap();
    let status = act(&mut table, &mut hand, PlayerAction::fold(1)).unwrap();

    assert_eq!(status, HandStatus::Finished);
    assert!(hand.is_complete());
    assert!(!hand.reached_showdown);
    assert_eq!(hand.winners.len(), 1);
    assert_eq!(hand.winners[0].agent_id, 2);
    assert_eq!(hand.winners[0].amount, Chips(14));
    assert_eq!(hand.winners[0].hand_description, "Others folded");

    assert_eq!(stack_of(&table, 1), Chips(98));
    assert_eq!(stack_of(&table, 2), Chips(102));
    assert_eq!(table.status, TableStatus::BetweenHands);
    assert_eq!(table.current_hand_id, None);
    assert_eq!(table.last_hand_completed_at, Some(START + 100));
}

#[test]
fn actions_out_of_turn_are_rejected() {
    let mut table = table_with(&[100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);

    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::check(2)),
        Err(EngineError::NotPlayersTurn(2))
    );
    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::check(99)),
        Err(EngineError::PlayerNotInHand(99))
    );
    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::check(1)),
        Err(EngineError::CannotCheck { to_call: Chips(1) })
    );
}

//
// ====================== РЕЙЗЫ ======================
//

#[test]
fn short_all_in_does_not_reopen_min_raise() {
    // Кнопка – место 0 (70 фишек), SB – место 1, BB – место 2.
    let mut table = table_with(&[70, 1_000, 1_000], 20, 40);
    let mut hand = deal(&mut table, 1);
    assert_eq!(hand.turn, Turn::Player(0));

    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::raise(1, 60)),
        Err(EngineError::RaiseTooSmall {
            min_raise_to: Chips(80),
            attempted: Chips(60)
        })
    );

    act(&mut table, &mut hand, PlayerAction::all_in(1)).unwrap();
    assert_eq!(hand.current_bet, Chips(70));
    assert_eq!(hand.last_full_raise, Chips(40));
    assert!(hand.players[0].all_in);

    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::raise(2, 100)),
        Err(EngineError::RaiseTooSmall {
            min_raise_to: Chips(110),
            attempted: Chips(100)
        })
    );
    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::raise(2, 2_000)),
        Err(EngineError::InsufficientFunds {
            available: Chips(1_000),
            required: Chips(2_000)
        })
    );
    assert_eq!(act(&mut table, &mut hand, PlayerAction::raise(2, 110)), Ok(HandStatus::Ongoing));
    assert_eq!(hand.last_full_raise, Chips(40));
}

#[test]
fn short_big_blind_leaves_small_blind_as_bet_to_call() {
    // Кнопка – место 0, SB (5) – место 1, BB – место 2 всего с 3 фишками.
    let mut table = table_with(&[100, 100, 3], 5, 10);
    let mut hand = deal(&mut table, 1);

    assert_eq!(hand.players[2].current_bet, Chips(3));
    assert!(hand.players[2].all_in);
    assert_eq!(hand.pot, Chips(8));
    assert_eq!(hand.current_bet, Chips(5));
    assert_eq!(hand.last_full_raise, Chips(5));
    assert_eq!(hand.turn, Turn::Player(0));

    assert_eq!(
        act(&mut table, &mut hand, PlayerAction::raise(1, 9)),
        Err(EngineError::RaiseTooSmall {
            min_raise_to: Chips(10),
            attempted: Chips(9)
        })
    );
    act(&mut table, &mut hand, PlayerAction::call(1)).unwrap();
    assert_eq!(hand.players[0].current_bet, Chips(5));

    // SB уже уравнял ставку и может чекнуть.
    assert_eq!(hand.turn, Turn::Player(1));
    let kinds: Vec<ActionKind> = valid_actions(&hand, 1).iter().map(|a| a.kind).collect();
    assert!(kinds.contains(&ActionKind::Check));
    assert!(!kinds.contains(&ActionKind::Call));
    act(&mut table, &mut hand, PlayerAction::check(2)).unwrap();
    assert_eq!(hand.street, Street::Flop);
}

#[test]
fn raise_for_whole_stack_below_bet_is_logged_as_all_in() {
    let mut table = table_with(&[30, 1_000, 1_000], 20, 40);
    let mut hand = deal(&mut table, 1);
    assert_eq!(hand.turn, Turn::Player(0));

    let mut log = ActionLog::new();
    let status = apply_action(
        &mut table,
        &mut hand,
        &PlayerAction::raise(1, 30),
        START + 100,
        &TimeRules::standard(),
        &mut log,
    );
    assert_eq!(status, Ok(HandStatus::Ongoing));
    assert!(hand.players[0].all_in);
    assert_eq!(hand.current_bet, Chips(40));

    let entry = &log.entries()[0];
    assert_eq!(entry.kind, ActionKind::AllIn);
    assert_eq!(entry.amount, Some(Chips(30)));
    let last = hand.last_action.as_ref().expect("действие записано");
    assert_eq!((last.kind, last.amount), (ActionKind::AllIn, Some(Chips(30))));
}

#[test]
fn valid_actions_for_small_blind_heads_up() {
    let mut table = table_with(&[100, 100], 1, 2);
    let hand = deal(&mut table, 1);

    let actions = valid_actions(&hand, 0);
    let kinds: Vec<ActionKind> = actions.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![ActionKind::Fold, ActionKind::Call, ActionKind::Raise, ActionKind::AllIn]
    );
    assert_eq!(
        actions[2],
        ValidAction {
            kind: ActionKind::Raise,
            min_amount: Some(Chips(4)),
            max_amount: Some(Chips(100)),
        }
    );
    // Не его ход – пусто.
    assert!(valid_actions(&hand, 1).is_empty());
}

#[test]
fn bet_and_raise_need_amount_and_call_needs_a_bet() {
    let mut table = table_with(&[100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);
    act(&mut table, &mut hand, PlayerAction::call(1)).unwrap();

    let no_amount = PlayerAction::new(2, ActionKind::Raise, None);
    assert_eq!(act(&mut table, &mut hand, no_amount), Err(EngineError::AmountRequired));
    assert_eq!(act(&mut table, &mut hand, PlayerAction::call(2)), Err(EngineError::CannotCall));
}

//
// ====================== УЛИЦЫ ======================
//

#[test]
fn street_closes_when_everyone_matched() {
    let mut table = table_with(&[1_000, 1_000, 1_000], 5, 10);
    let mut hand = deal(&mut table, 1);
    assert_eq!(hand.turn, Turn::Player(0));

    act(&mut table, &mut hand, PlayerAction::call(1)).unwrap();
    act(&mut table, &mut hand, PlayerAction::call(2)).unwrap();
    assert_eq!(hand.street, Street::Preflop);
    act(&mut table, &mut hand, PlayerAction::check(3)).unwrap();

    assert_eq!(hand.street, Street::Flop);
    assert_eq!(hand.pot, Chips(30));
    assert_eq!(hand.current_bet, Chips::ZERO);
    assert!(hand.players.iter().all(|p| p.current_bet.is_zero() && !p.has_acted));
    assert_eq!(hand.turn, Turn::Player(1));
}

#[test]
fn big_blind_gets_option_after_limpers() {
    let mut table = table_with(&[1_000, 1_000, 1_000], 5, 10);
    let mut hand = deal(&mut table, 1);

    act(&mut table, &mut hand, PlayerAction::call(1)).unwrap();
    act(&mut table, &mut hand, PlayerAction::call(2)).unwrap();
    assert_eq!(hand.turn, Turn::Player(2));
    act(&mut table, &mut hand, PlayerAction::raise(3, 30)).unwrap();

    assert_eq!(hand.street, Street::Preflop);
    assert_eq!(hand.turn, Turn::Player(0));
}

//
// ====================== САЙД-ПОТЫ ======================
//

#[test]
fn three_way_all_in_builds_side_pot() {
    let mut table = table_with(&[50, 150, 150], 5, 10);
    let deck = Deck::from_top(
        Card::parse_many(&[
            "As", "Ah", "Ks", "Kh", "Qs", "Qh", // карманные
            "2c", "7d", "9h", "3s", "4c", // борд
        ])
        .unwrap(),
    );
    let mut hand =
        start_hand_with_deck(&mut table, deck, 1, START, &TimeRules::standard()).unwrap();

    act(&mut table, &mut hand, PlayerAction::all_in(1)).unwrap();
    act(&mut table, &mut hand, PlayerAction::all_in(2)).unwrap();
    let status = act(&mut table, &mut hand, PlayerAction::call(3)).unwrap();

    assert_eq!(status, HandStatus::Finished);
    assert!(hand.reached_showdown);
    assert_eq!(hand.board.len(), 5);
    assert_eq!(hand.side_pots.len(), 2);
    assert_eq!(hand.side_pots[0].amount, Chips(150));
    assert_eq!(hand.side_pots[0].eligible, vec![1, 2, 3]);
    assert_eq!(hand.side_pots[1].amount, Chips(200));
    assert_eq!(hand.side_pots[1].eligible, vec![2, 3]);

    assert_eq!(hand.amount_won_by(1), Chips(150));
    assert_eq!(hand.amount_won_by(2), Chips(200));
    assert_eq!(hand.amount_won_by(3), Chips::ZERO);
    assert_eq!(hand.winners[0].hand_description, "Pair (A♠ A♥)");

    assert_eq!(stack_of(&table, 1), Chips(150));
    assert_eq!(stack_of(&table, 2), Chips(200));
    assert_eq!(stack_of(&table, 3), Chips::ZERO);
    assert_eq!(table.status, TableStatus::BetweenHands);
}

#[test]
fn blinds_all_in_runs_board_out_immediately() {
    // Оба стека меньше блайндов: действовать некому.
    let mut table = table_with(&[1, 2], 1, 2);
    let hand = deal(&mut table, 1);

    assert!(hand.is_complete());
    assert_eq!(hand.board.len(), 5);
    assert_eq!(table.current_hand_id, None);
    assert_eq!(table.total_stacks(), Chips(3));
}

//
// ====================== ВРЕМЯ ======================
//

#[test]
fn player_action_accepted_within_grace() {
    let rules = TimeRules::standard();
    let mut table = table_with(&[100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);
    let deadline = hand.action_deadline.unwrap();
    let mut log = ActionLog::new();

    assert_eq!(
        apply_action(&mut table, &mut hand, &PlayerAction::call(1), deadline + rules.grace_ms + 1, &rules, &mut log),
        Err(EngineError::DeadlinePassed)
    );
    assert!(log.is_empty());
    assert_eq!(
        apply_action(&mut table, &mut hand, &PlayerAction::call(1), deadline + rules.grace_ms, &rules, &mut log),
        Ok(HandStatus::Ongoing)
    );
    assert_eq!(log.len(), 1);
    assert_eq!(log.entries()[0].amount, Some(Chips(1)));
}

#[test]
fn forced_actions_ignore_deadline_and_count_strikes() {
    let rules = TimeRules::standard();
    let mut table = table_with(&[100, 100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);
    let late = hand.action_deadline.unwrap() + 60_000;
    let mut log = ActionLog::new();

    let forced = PlayerAction::fold(1).with_source(ActionSource::Timeout);
    apply_action(&mut table, &mut hand, &forced, late, &rules, &mut log).unwrap();
    assert_eq!(log.entries()[0].source, ActionSource::Timeout);

    let seat = table.occupant(0).unwrap();
    assert_eq!(seat.consecutive_timeouts, 1);
    assert!(!seat.sitting_out);
}

#[test]
fn second_strike_sits_agent_out_and_player_action_resets() {
    let rules = TimeRules::standard();
    let mut table = table_with(&[100, 100, 100], 1, 2);
    table.seats[0].as_mut().unwrap().consecutive_timeouts = 1;
    table.seats[1].as_mut().unwrap().consecutive_timeouts = 1;
    let mut hand = deal(&mut table, 1);
    let mut log = ActionLog::new();

    let forced = PlayerAction::fold(1).with_source(ActionSource::Timeout);
    apply_action(&mut table, &mut hand, &forced, START, &rules, &mut log).unwrap();
    apply_action(&mut table, &mut hand, &PlayerAction::call(2), START, &rules, &mut log).unwrap();

    let timed_out = table.occupant(0).unwrap();
    assert_eq!(timed_out.consecutive_timeouts, 2);
    assert!(timed_out.sitting_out);
    assert_eq!(table.occupant(1).unwrap().consecutive_timeouts, 0);
}

//
// ====================== КНОПКА ======================
//

#[test]
fn button_rotates_between_hands() {
    let mut table = table_with(&[100, 100, 100], 1, 2);
    let mut hand = deal(&mut table, 1);
    assert_eq!(hand.dealer_seat, 0);

    act(&mut table, &mut hand, PlayerAction::fold(1)).unwrap();
    act(&mut table, &mut hand, PlayerAction::fold(2)).unwrap();
    assert!(hand.is_complete());

    let second = deal(&mut table, 2);
    assert_eq!(second.dealer_seat, 1);
    assert_eq!(second.hand_number, 2);
    // Место 2 – малый блайнд, место 0 – большой, первым ходит кнопка.
    assert_eq!(second.players[2].current_bet, Chips(1));
    assert_eq!(second.players[0].current_bet, Chips(2));
    assert_eq!(second.turn, Turn::Player(1));
}

#[test]
fn second_hand_cannot_start_while_one_is_running() {
    let mut table = table_with(&[100, 100], 1, 2);
    let _hand = deal(&mut table, 1);
    let again = start_hand_with_deck(&mut table, Deck::standard_52(), 2, START, &TimeRules::standard());
    assert_eq!(again, Err(EngineError::HandAlreadyInProgress(1)));
}

#[test]
fn single_eligible_player_cannot_start() {
    let mut table = table_with(&[100, 0], 1, 2);
    let res = start_hand_with_deck(&mut table, Deck::standard_52(), 1, START, &TimeRules::standard());
    assert_eq!(res, Err(EngineError::NotEnoughPlayers));
}
