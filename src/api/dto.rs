use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::hand::{LastAction, SidePot, Street};
use crate::domain::table::{SeatIndex, TableStatus};
use crate::domain::{AgentId, HandId, TableId, Timestamp};
use crate::engine::actions::{ActionKind, ActionSource};
use crate::engine::betting::ValidAction;
use crate::engine::HandStatus;

/// Карты в виде кодов `"Ah"`, `"Td"`.
pub fn card_codes(cards: &[Card]) -> Vec<String> {
    cards.iter().map(Card::to_string).collect()
}

/// Занятое место за столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatDto {
    pub seat_index: SeatIndex,
    pub agent_id: AgentId,
    pub agent_name: String,
    pub stack: Chips,
    pub sitting_out: bool,
}

/// Строка лобби.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableListItemDto {
    pub table_id: TableId,
    pub name: String,
    pub status: TableStatus,
    pub seated: usize,
    pub max_seats: u8,
    /// `"sb/bb"`.
    pub blinds: String,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub seats: Vec<SeatDto>,
    pub frozen: bool,
}

/// Участник раздачи в публичном виде.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandPlayerDto {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub seat_index: SeatIndex,
    pub stack: Chips,
    pub current_bet: Chips,
    pub total_bet: Chips,
    pub folded: bool,
    pub all_in: bool,
    /// None, если смотрящему карты не положены.
    pub hole_cards: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerDto {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub amount: Chips,
    pub hand_description: String,
}

/// Раздача глазами наблюдателя или конкретного агента.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandStateDto {
    pub hand_id: HandId,
    pub hand_number: u64,
    pub street: Street,
    pub board: Vec<String>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub dealer_seat: SeatIndex,
    pub current_seat: Option<SeatIndex>,
    pub action_deadline: Option<Timestamp>,
    pub players: Vec<HandPlayerDto>,
    pub side_pots: Vec<SidePot>,
    pub last_action: Option<LastAction>,
    pub winners: Vec<WinnerDto>,
    pub reached_showdown: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableStateDto {
    pub table: TableListItemDto,
    pub dealer_button: Option<SeatIndex>,
    pub hand: Option<HandStateDto>,
}

/// Ответ на "моя раздача".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerHandViewDto {
    pub table_id: TableId,
    pub hand_id: HandId,
    pub hand_number: u64,
    pub street: Street,
    pub pot: Chips,
    pub board: Vec<String>,
    pub current_bet: Chips,
    pub to_call: Chips,
    pub my_cards: Vec<String>,
    pub my_stack: Chips,
    pub my_bet: Chips,
    pub your_turn: bool,
    pub action_deadline: Option<Timestamp>,
    pub players: Vec<HandPlayerDto>,
    pub valid_actions: Vec<ValidAction>,
    pub last_action: Option<LastAction>,
    pub winners: Vec<WinnerDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntryDto {
    pub rank: usize,
    pub agent_id: AgentId,
    pub name: String,
    pub balance: Chips,
    pub hands_played: u64,
    pub hands_won: u64,
    /// `"42.9%"` или `"N/A"`.
    pub win_rate: String,
    pub net_profit: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileDto {
    pub agent_id: AgentId,
    pub name: String,
    pub description: Option<String>,
    pub balance: Chips,
    pub hands_played: u64,
    pub hands_won: u64,
    pub total_winnings: Chips,
    pub total_losses: Chips,
    pub win_rate: String,
    pub net_profit: i64,
    pub created_at: Timestamp,
    /// Столы, за которыми агент сейчас сидит.
    pub tables: Vec<TableId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartbeatTableDto {
    pub table_id: TableId,
    pub table_name: String,
    pub seat_index: SeatIndex,
    pub stack: Chips,
    pub sitting_out: bool,
    pub status: TableStatus,
    pub hand_id: Option<HandId>,
    pub your_turn: bool,
    pub action_deadline: Option<Timestamp>,
}

/// Что агенту стоит сделать прямо сейчас.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartbeatDto {
    pub agent_id: AgentId,
    pub balance: Chips,
    pub tables: Vec<HeartbeatTableDto>,
    pub has_pending_action: bool,
}

/// Завершённая раздача в истории стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandHistoryItemDto {
    pub hand_id: HandId,
    pub hand_number: u64,
    pub pot: Chips,
    pub board: Vec<String>,
    pub winners: Vec<WinnerDto>,
    pub reached_showdown: bool,
    pub completed_at: Option<Timestamp>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionLogItemDto {
    pub street: Street,
    pub agent_id: AgentId,
    pub agent_name: String,
    pub kind: ActionKind,
    pub amount: Option<Chips>,
    pub source: ActionSource,
    pub at: Timestamp,
}

/// Ответ API на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResponse {
    AgentRegistered {
        agent_id: AgentId,
        name: String,
        balance: Chips,
    },
    TableCreated {
        table_id: TableId,
    },
    Seated {
        seat_index: SeatIndex,
    },
    Left {
        refund: Chips,
    },
    Rebought {
        stack: Chips,
    },
    SitOut {
        sitting_out: bool,
    },
    HandStarted {
        hand_id: HandId,
        hand_number: u64,
    },
    ActionApplied {
        status: HandStatus,
    },
    /// Успешный результат без доп.данных.
    Ok,
}
