use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank, Suit};
use crate::engine::RandomSource;

/// Колода карт. Верх колоды = конец вектора (`draw_one` делает pop).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    /// Стандартная 52-карточная колода в порядке:
    /// Clubs 2..A, Diamonds 2..A, Hearts 2..A, Spades 2..A.
    pub fn standard_52() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck { cards }
    }

    /// Свежая колода, перемешанная переданным источником случайности.
    pub fn shuffled<R: RandomSource>(rng: &mut R) -> Self {
        let mut deck = Deck::standard_52();
        rng.shuffle(&mut deck.cards);
        deck
    }

    /// Колода с заранее заданным порядком: `top_first[0]` будет снята первой.
    /// Используется в тестах и при воспроизведении раздач.
    pub fn from_top(top_first: Vec<Card>) -> Self {
        let mut cards = top_first;
        cards.reverse();
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Взять одну карту сверху колоды.
    pub fn draw_one(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Взять n карт сверху. Если карт не хватает, вернёт сколько есть.
    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        let mut taken = Vec::with_capacity(n);
        for _ in 0..n {
            match self.cards.pop() {
                Some(card) => taken.push(card),
                None => break,
            }
        }
        taken
    }
}
