//! Тесты оценки рук.
//!
//! Здесь мы проверяем:
//! - роял и колесо (A-2-3-4-5) в стрит-флеше;
//! - тай-брейкеры по кикерам;
//! - выбор лучшей пятёрки из семи карт;
//! - свойства сравнения (proptest): антисимметрия и независимость от порядка карт.

use std::cmp::Ordering;

use proptest::prelude::*;

use agent_holdem::domain::card::{Card, Rank, Suit};
use agent_holdem::eval::{compare, evaluate, evaluate_best_hand, EvalError, HandCategory};

fn cards(codes: &[&str]) -> Vec<Card> {
    Card::parse_many(codes).expect("корректные коды карт")
}

//
// ====================== КАТЕГОРИИ ======================
//

#[test]
fn royal_flush_from_seven_cards() {
    let v = evaluate(&cards(&["As", "Ks", "Qs", "Js", "Ts", "2c", "2d"])).unwrap();
    assert_eq!(v.category, HandCategory::RoyalFlush);
    assert_eq!(v.class(), 10);
}

#[test]
fn wheel_straight_flush_has_five_high() {
    let v = evaluate(&cards(&["Ah", "2h", "3h", "4h", "5h", "Kd", "Qc"])).unwrap();
    assert_eq!(v.category, HandCategory::StraightFlush);
    assert_eq!(v.tiebreakers, vec![5]);
}

#[test]
fn wheel_loses_to_six_high_straight() {
    let wheel = evaluate(&cards(&["Ah", "2d", "3c", "4s", "5h"])).unwrap();
    let six_high = evaluate(&cards(&["2d", "3c", "4s", "5h", "6c"])).unwrap();
    assert_eq!(wheel.category, HandCategory::Straight);
    assert_eq!(wheel.tiebreakers, vec![5]);
    assert_eq!(compare(&wheel, &six_high), Ordering::Less);
}

#[test]
fn seven_cards_pick_best_five() {
    // Фулл-хаус из двух троек: берётся старшая тройка и пара из младшей.
    let v = evaluate(&cards(&["9c", "9d", "9h", "4s", "4c", "4d", "Ah"])).unwrap();
    assert_eq!(v.category, HandCategory::FullHouse);
    assert_eq!(v.tiebreakers, vec![9, 4]);
}

#[test]
fn flush_beats_straight_on_same_board() {
    let board = cards(&["9h", "Th", "Jd", "2h", "3c"]);
    let flush = evaluate_best_hand(&cards(&["Ah", "4h"]), &board).unwrap();
    let straight = evaluate_best_hand(&cards(&["Qs", "Kc"]), &board).unwrap();
    assert_eq!(flush.category, HandCategory::Flush);
    assert_eq!(straight.category, HandCategory::Straight);
    assert_eq!(compare(&flush, &straight), Ordering::Greater);
}

//
// ====================== КИКЕРЫ ======================
//

#[test]
fn pair_kicker_decides() {
    let board = cards(&["Ad", "7c", "8s", "2h", "3d"]);
    let ace_king = evaluate_best_hand(&cards(&["As", "Kh"]), &board).unwrap();
    let ace_queen = evaluate_best_hand(&cards(&["Ac", "Qh"]), &board).unwrap();
    assert_eq!(ace_king.category, HandCategory::Pair);
    assert_eq!(ace_king.tiebreakers, vec![14, 13, 8, 7]);
    assert_eq!(compare(&ace_king, &ace_queen), Ordering::Greater);
}

#[test]
fn board_plays_gives_exact_tie() {
    let board = cards(&["As", "Ks", "Qd", "Jc", "Th"]);
    let a = evaluate_best_hand(&cards(&["2c", "3d"]), &board).unwrap();
    let b = evaluate_best_hand(&cards(&["4c", "5d"]), &board).unwrap();
    assert_eq!(compare(&a, &b), Ordering::Equal);
}

#[test]
fn two_pair_uses_best_kicker() {
    let v = evaluate(&cards(&["Kc", "Kd", "5h", "5s", "2c", "Qh", "Jd"])).unwrap();
    assert_eq!(v.category, HandCategory::TwoPair);
    assert_eq!(v.tiebreakers, vec![13, 5, 12]);
}

//
// ====================== ОШИБКИ ======================
//

#[test]
fn wrong_card_count_is_rejected() {
    assert_eq!(
        evaluate(&cards(&["As", "Ks", "Qs", "Js"])),
        Err(EvalError::WrongCardCount(4))
    );
}

#[test]
fn duplicate_card_is_rejected() {
    let dup = Card::new(Rank::Ace, Suit::Spades);
    assert_eq!(
        evaluate(&cards(&["As", "Ks", "Qs", "Js", "As"])),
        Err(EvalError::DuplicateCard(dup))
    );
}

//
// ====================== СВОЙСТВА ======================
//

fn card_from_index(i: u8) -> Card {
    Card::new(Rank::ALL[(i % 13) as usize], Suit::ALL[(i / 13) as usize])
}

fn seven_distinct_cards() -> impl Strategy<Value = Vec<Card>> {
    proptest::sample::subsequence((0u8..52).collect::<Vec<_>>(), 7)
        .prop_shuffle()
        .prop_map(|idx| idx.into_iter().map(card_from_index).collect())
}

proptest! {
    #[test]
    fn evaluation_ignores_card_order(hand in seven_distinct_cards()) {
        let mut reversed = hand.clone();
        reversed.reverse();
        prop_assert_eq!(evaluate(&hand).unwrap(), evaluate(&reversed).unwrap());
    }

    #[test]
    fn compare_is_antisymmetric(a in seven_distinct_cards(), b in seven_distinct_cards()) {
        let va = evaluate(&a).unwrap();
        let vb = evaluate(&b).unwrap();
        prop_assert_eq!(compare(&va, &vb), compare(&vb, &va).reverse());
    }

    #[test]
    fn seven_cards_never_worse_than_any_five(hand in seven_distinct_cards()) {
        let best = evaluate(&hand).unwrap();
        let first_five = evaluate(&hand[..5]).unwrap();
        prop_assert_ne!(compare(&best, &first_five), Ordering::Less);
    }
}
