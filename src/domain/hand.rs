use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::player::HandPlayer;
use crate::domain::table::SeatIndex;
use crate::domain::{AgentId, HandId, TableId, Timestamp};
use crate::engine::actions::{ActionKind, ActionSource};

/// Улица раздачи. `Complete` – раздача завершена и расчёт сделан.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Complete,
}

impl Street {
    /// Следующая улица ставок. После ривера – None (дальше шоудаун).
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River | Street::Complete => None,
        }
    }

    /// Сколько общих карт открывается при переходе на эту улицу.
    pub fn cards_revealed(self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
            Street::Preflop | Street::Complete => 0,
        }
    }
}

/// Чей ход. `None` – никто не должен действовать (раздача закрыта
/// или ждёт автоматического доезда борда).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    #[default]
    None,
    Player(usize),
}

impl Turn {
    pub fn index(self) -> Option<usize> {
        match self {
            Turn::None => None,
            Turn::Player(i) => Some(i),
        }
    }
}

/// Банк (основной или побочный) и агенты, которые могут его выиграть.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidePot {
    pub amount: Chips,
    pub eligible: Vec<AgentId>,
}

/// Последнее принятое действие в раздаче.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastAction {
    pub agent_id: AgentId,
    pub kind: ActionKind,
    pub amount: Option<Chips>,
    pub source: ActionSource,
    pub at: Timestamp,
}

/// Победитель раздачи (агрегировано по всем банкам).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Winner {
    pub agent_id: AgentId,
    pub seat_index: SeatIndex,
    pub amount: Chips,
    /// "Flush (A♠ K♠)" или "Others folded".
    pub hand_description: String,
}

/// Полное состояние одной раздачи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hand {
    pub id: HandId,
    pub table_id: TableId,
    pub hand_number: u64,
    pub street: Street,
    /// Остаток колоды. Никогда не покидает движок.
    pub deck: Deck,
    pub board: Vec<Card>,
    /// Сумма всех вкладов за раздачу.
    pub pot: Chips,
    /// Заполняется при расчёте.
    pub side_pots: Vec<SidePot>,
    /// Сумма, до которой надо уравнять на текущей улице.
    pub current_bet: Chips,
    /// Размер последнего полного повышения.
    pub last_full_raise: Chips,
    pub big_blind: Chips,
    pub turn: Turn,
    pub action_deadline: Option<Timestamp>,
    pub last_action: Option<LastAction>,
    pub dealer_seat: SeatIndex,
    /// Участники в порядке мест.
    pub players: Vec<HandPlayer>,
    pub winners: Vec<Winner>,
    /// Раздача закончилась вскрытием карт, а не фолдами.
    pub reached_showdown: bool,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Hand {
    pub fn is_complete(&self) -> bool {
        self.street == Street::Complete
    }

    pub fn player_index(&self, agent_id: AgentId) -> Option<usize> {
        self.players.iter().position(|p| p.agent_id == agent_id)
    }

    pub fn player(&self, agent_id: AgentId) -> Option<&HandPlayer> {
        self.players.iter().find(|p| p.agent_id == agent_id)
    }

    /// Игрок, чей сейчас ход.
    pub fn current_player(&self) -> Option<&HandPlayer> {
        self.turn.index().and_then(|i| self.players.get(i))
    }

    pub fn live_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_live()).count()
    }

    pub fn actionable_count(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    /// Сумма вкладов игроков, должна совпадать с `pot`.
    pub fn total_contributed(&self) -> Chips {
        self.players.iter().map(|p| p.total_bet).sum()
    }

    /// Сколько агент выиграл в этой раздаче.
    pub fn amount_won_by(&self, agent_id: AgentId) -> Chips {
        self.winners
            .iter()
            .filter(|w| w.agent_id == agent_id)
            .map(|w| w.amount)
            .sum()
    }

    /// Просрочен ли ход (без учёта grace-периода).
    pub fn is_past_deadline(&self, now: Timestamp) -> bool {
        matches!(self.action_deadline, Some(deadline) if now > deadline)
    }
}
