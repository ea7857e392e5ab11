use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

/// Категория покерной руки по силе: 1 = старшая карта … 10 = роял-флеш.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    /// Числовой класс 1..=10.
    pub fn class(self) -> u8 {
        self as u8
    }

    /// Английское название, оно же уходит в описание победителя.
    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Сила руки: категория + вектор тай-брейкеров (значения рангов 2..=14).
///
/// Состав тай-брейкеров по категориям:
///   - роял: пусто;
///   - стрит / стрит-флеш: [старшая карта] (колесо = 5);
///   - каре: [каре, кикер];
///   - фулл-хаус: [тройка, пара];
///   - флеш / старшая карта: все пять рангов по убыванию;
///   - тройка: [тройка, k1, k2];
///   - две пары: [старшая пара, младшая пара, кикер];
///   - пара: [пара, k1, k2, k3].
///
/// Порядок (`Ord`) – сначала категория, потом тай-брейкеры лексикографически.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HandValue {
    pub category: HandCategory,
    pub tiebreakers: Vec<u8>,
}

impl HandValue {
    pub fn new(category: HandCategory, tiebreakers: Vec<u8>) -> Self {
        Self {
            category,
            tiebreakers,
        }
    }

    pub fn class(&self) -> u8 {
        self.category.class()
    }

    pub fn name(&self) -> &'static str {
        self.category.name()
    }
}

impl Ord for HandValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.tiebreakers.cmp(&other.tiebreakers))
    }
}

impl PartialOrd for HandValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Сравнение двух рук: Less / Equal / Greater.
pub fn compare(a: &HandValue, b: &HandValue) -> Ordering {
    a.cmp(b)
}
