use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::{AgentId, HandId, TableId, Timestamp};

/// Индекс места за столом (0..max_seats-1).
pub type SeatIndex = u8;

/// Допустимое число мест за столом.
pub const MIN_SEATS: u8 = 2;
pub const MAX_SEATS: u8 = 9;

/// Статус стола.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Меньше двух игроков, готовых играть.
    Waiting,
    /// Раздачи нет, но можно начинать.
    BetweenHands,
    /// Идёт раздача.
    Playing,
}

/// Стейки стола (SB/BB).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableStakes {
    pub small_blind: Chips,
    pub big_blind: Chips,
}

impl TableStakes {
    pub fn new(sb: Chips, bb: Chips) -> Self {
        Self {
            small_blind: sb,
            big_blind: bb,
        }
    }
}

/// Конфиг стола: сколько мест, блайнды, рамки бай-ина.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    pub max_seats: u8,
    pub stakes: TableStakes,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
}

impl TableConfig {
    pub fn new(max_seats: u8, sb: u64, bb: u64, min_buy_in: u64, max_buy_in: u64) -> Self {
        Self {
            max_seats,
            stakes: TableStakes::new(Chips(sb), Chips(bb)),
            min_buy_in: Chips(min_buy_in),
            max_buy_in: Chips(max_buy_in),
        }
    }

    /// 2..=9 мест, 0 < SB < BB, 0 < min_buy_in <= max_buy_in.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&self.max_seats) {
            return Err(format!(
                "число мест должно быть от {MIN_SEATS} до {MAX_SEATS}, получено {}",
                self.max_seats
            ));
        }
        let TableStakes {
            small_blind,
            big_blind,
        } = self.stakes;
        if small_blind.is_zero() || small_blind >= big_blind {
            return Err(format!(
                "блайнды должны удовлетворять 0 < SB < BB, получено {small_blind}/{big_blind}"
            ));
        }
        if self.min_buy_in.is_zero() || self.min_buy_in > self.max_buy_in {
            return Err(format!(
                "некорректные рамки бай-ина: {}..{}",
                self.min_buy_in, self.max_buy_in
            ));
        }
        Ok(())
    }
}

/// Агент, сидящий на месте.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatOccupant {
    pub agent_id: AgentId,
    /// Стек между раздачами. Во время раздачи авторитетен стек в `Hand`.
    pub stack: Chips,
    pub sitting_out: bool,
    /// Подряд пропущенные ходы (по таймауту).
    pub consecutive_timeouts: u32,
}

impl SeatOccupant {
    pub fn new(agent_id: AgentId, stack: Chips) -> Self {
        Self {
            agent_id,
            stack,
            sitting_out: false,
            consecutive_timeouts: 0,
        }
    }

    /// Будет ли сдана карта в следующей раздаче.
    pub fn is_eligible(&self) -> bool {
        !self.sitting_out && !self.stack.is_zero()
    }
}

/// Основное состояние стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub config: TableConfig,

    /// Места за столом: индекс вектора = SeatIndex.
    /// None – место пустое.
    pub seats: Vec<Option<SeatOccupant>>,

    /// Место дилерской кнопки или None, если раздач ещё не было.
    pub dealer_button: Option<SeatIndex>,

    pub status: TableStatus,

    /// ID текущей раздачи (если она идёт).
    pub current_hand_id: Option<HandId>,

    /// Счётчик сданных раздач, из него берётся номер раздачи.
    pub hands_dealt: u64,

    pub last_hand_completed_at: Option<Timestamp>,

    /// Стол заморожен после обнаружения нарушенной целостности.
    pub frozen_reason: Option<String>,

    pub created_at: Timestamp,
}

impl Table {
    /// Создать пустой стол с заданной конфигурацией.
    pub fn new(id: TableId, name: String, config: TableConfig, created_at: Timestamp) -> Self {
        let seats = vec![None; config.max_seats as usize];
        Self {
            id,
            name,
            config,
            seats,
            dealer_button: None,
            status: TableStatus::Waiting,
            current_hand_id: None,
            hands_dealt: 0,
            last_hand_completed_at: None,
            frozen_reason: None,
            created_at,
        }
    }

    pub fn max_seats(&self) -> u8 {
        self.config.max_seats
    }

    pub fn small_blind(&self) -> Chips {
        self.config.stakes.small_blind
    }

    pub fn big_blind(&self) -> Chips {
        self.config.stakes.big_blind
    }

    pub fn seated_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_seat_empty(&self, index: SeatIndex) -> bool {
        self.seats
            .get(index as usize)
            .map(|s| s.is_none())
            .unwrap_or(true)
    }

    pub fn first_empty_seat(&self) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|s| s.is_none())
            .map(|i| i as SeatIndex)
    }

    pub fn occupant(&self, seat: SeatIndex) -> Option<&SeatOccupant> {
        self.seats.get(seat as usize).and_then(|s| s.as_ref())
    }

    pub fn occupant_mut(&mut self, seat: SeatIndex) -> Option<&mut SeatOccupant> {
        self.seats.get_mut(seat as usize).and_then(|s| s.as_mut())
    }

    pub fn seat_of(&self, agent_id: AgentId) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|s| matches!(s, Some(o) if o.agent_id == agent_id))
            .map(|i| i as SeatIndex)
    }

    /// Места, которым будут сданы карты, по возрастанию.
    pub fn eligible_seats(&self) -> Vec<SeatIndex> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Some(o) if o.is_eligible() => Some(i as SeatIndex),
                _ => None,
            })
            .collect()
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible_seats().len()
    }

    /// Статус стола вне раздачи по числу готовых игроков.
    pub fn resting_status(&self) -> TableStatus {
        if self.eligible_count() >= 2 {
            TableStatus::BetweenHands
        } else {
            TableStatus::Waiting
        }
    }

    /// Пересчитать статус, если раздача не идёт.
    pub fn refresh_resting_status(&mut self) {
        if self.status != TableStatus::Playing {
            self.status = self.resting_status();
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_reason.is_some()
    }

    /// Сумма стеков всех сидящих.
    pub fn total_stacks(&self) -> Chips {
        self.seats.iter().flatten().map(|o| o.stack).sum()
    }
}
