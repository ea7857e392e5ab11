use std::collections::HashSet;

use thiserror::Error;

use crate::domain::card::{Card, Suit};

use super::hand_rank::{HandCategory, HandValue};
use super::lookup_tables::{detect_straight, rank_to_bit, RankMask};

/// Ошибки оценки руки.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("для оценки нужно от 5 до 7 карт, передано {0}")]
    WrongCardCount(usize),

    #[error("карта {0} встречается дважды")]
    DuplicateCard(Card),
}

/// Лучшая 5-карточная рука из 5..=7 карт.
///
/// Перебираются все C(n,5) комбинаций (для 7 карт – 21).
pub fn evaluate(cards: &[Card]) -> Result<HandValue, EvalError> {
    let n = cards.len();
    if !(5..=7).contains(&n) {
        return Err(EvalError::WrongCardCount(n));
    }
    let mut seen = HashSet::with_capacity(n);
    for card in cards {
        if !seen.insert(*card) {
            return Err(EvalError::DuplicateCard(*card));
        }
    }

    let mut best: Option<HandValue> = None;
    for a in 0..(n - 4) {
        for b in (a + 1)..(n - 3) {
            for c in (b + 1)..(n - 2) {
                for d in (c + 1)..(n - 1) {
                    for e in (d + 1)..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let value = evaluate_five(&five);
                        if best.as_ref().map_or(true, |b| value > *b) {
                            best = Some(value);
                        }
                    }
                }
            }
        }
    }

    best.ok_or(EvalError::WrongCardCount(n))
}

/// Удобная обёртка: карманные карты + борд.
pub fn evaluate_best_hand(hole: &[Card], board: &[Card]) -> Result<HandValue, EvalError> {
    let mut all_cards = Vec::with_capacity(hole.len() + board.len());
    all_cards.extend_from_slice(hole);
    all_cards.extend_from_slice(board);
    evaluate(&all_cards)
}

/// Оценка строго 5-карточной комбинации.
fn evaluate_five(cards: &[Card; 5]) -> HandValue {
    let first_suit: Suit = cards[0].suit;
    let is_flush = cards.iter().all(|c| c.suit == first_suit);

    let mut rank_counts = [0u8; 15]; // используем индексы 2..=14
    let mut rank_mask: RankMask = 0;
    for card in cards {
        rank_counts[card.rank.value() as usize] += 1;
        rank_mask |= rank_to_bit(card.rank);
    }
    let straight_high = detect_straight(rank_mask);

    // (ранг, количество), сначала по количеству, потом по рангу – по убыванию.
    let mut groups: Vec<(u8, u8)> = (2u8..=14)
        .rev()
        .filter(|r| rank_counts[*r as usize] > 0)
        .map(|r| (r, rank_counts[r as usize]))
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let pattern: Vec<u8> = groups.iter().map(|g| g.1).collect();
    let ranks: Vec<u8> = groups.iter().map(|g| g.0).collect();

    match (is_flush, straight_high) {
        (true, Some(14)) => return HandValue::new(HandCategory::RoyalFlush, Vec::new()),
        (true, Some(high)) => return HandValue::new(HandCategory::StraightFlush, vec![high]),
        _ => {}
    }

    match pattern.as_slice() {
        [4, 1] => return HandValue::new(HandCategory::FourOfAKind, ranks),
        [3, 2] => return HandValue::new(HandCategory::FullHouse, ranks),
        _ => {}
    }

    if is_flush {
        return HandValue::new(HandCategory::Flush, ranks);
    }
    if let Some(high) = straight_high {
        return HandValue::new(HandCategory::Straight, vec![high]);
    }

    let category = match pattern.as_slice() {
        [3, 1, 1] => HandCategory::ThreeOfAKind,
        [2, 2, 1] => HandCategory::TwoPair,
        [2, 1, 1, 1] => HandCategory::Pair,
        _ => HandCategory::HighCard,
    };
    HandValue::new(category, ranks)
}
