use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::agent::{Agent, AgentStats};
use crate::domain::hand::Hand;
use crate::domain::player::HandPlayer;
use crate::domain::table::Table;
use crate::domain::{AgentId, HandId, TableId};
use crate::engine::betting::{amount_to_call, valid_actions};
use crate::engine::table_manager::TableManager;
use crate::engine::EngineError;
use crate::infra::persistence::PokerStorage;

use super::dto::*;
use super::errors::ApiError;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 20;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    /// Список столов для лобби.
    ListTables,

    /// Состояние стола. Без `viewer` – взгляд наблюдателя.
    TableState {
        table_id: TableId,
        viewer: Option<AgentId>,
    },

    /// Текущая (или последняя) раздача стола глазами агента.
    MyHand { table_id: TableId, agent_id: AgentId },

    Leaderboard { limit: Option<usize> },

    Profile { name: String },

    /// Где агент сидит и ждут ли от него хода.
    Heartbeat { agent_id: AgentId },

    HandHistory {
        table_id: TableId,
        limit: Option<usize>,
    },

    HandActions { hand_id: HandId },
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum QueryResponse {
    Tables(Vec<TableListItemDto>),
    TableState(TableStateDto),
    MyHand(PlayerHandViewDto),
    Leaderboard(Vec<LeaderboardEntryDto>),
    Profile(ProfileDto),
    Heartbeat(HeartbeatDto),
    HandHistory(Vec<HandHistoryItemDto>),
    HandActions(Vec<ActionLogItemDto>),
}

pub fn run_query<S: PokerStorage>(manager: &TableManager<S>, query: Query) -> Result<QueryResponse, ApiError> {
    Ok(match query {
        Query::ListTables => QueryResponse::Tables(list_tables(manager)),
        Query::TableState { table_id, viewer } => QueryResponse::TableState(table_state(manager, table_id, viewer)?),
        Query::MyHand { table_id, agent_id } => QueryResponse::MyHand(my_hand(manager, table_id, agent_id)?),
        Query::Leaderboard { limit } => QueryResponse::Leaderboard(leaderboard(manager, limit)),
        Query::Profile { name } => QueryResponse::Profile(profile(manager, &name)?),
        Query::Heartbeat { agent_id } => QueryResponse::Heartbeat(heartbeat(manager, agent_id)?),
        Query::HandHistory { table_id, limit } => {
            QueryResponse::HandHistory(hand_history(manager, table_id, limit)?)
        }
        Query::HandActions { hand_id } => QueryResponse::HandActions(hand_actions(manager, hand_id)?),
    })
}

/// Видит ли `viewer` карманные карты игрока: свои видны всегда,
/// чужие открываются, когда раздача завершена и на столе был хотя бы флоп.
pub fn can_see_cards(hand: &Hand, player: &HandPlayer, viewer: Option<AgentId>) -> bool {
    viewer == Some(player.agent_id) || (hand.is_complete() && hand.board.len() >= 3)
}

pub fn list_tables<S: PokerStorage>(manager: &TableManager<S>) -> Vec<TableListItemDto> {
    let names = agent_names(manager);
    manager
        .tables()
        .iter()
        .map(|t| build_table_item(t, &names))
        .collect()
}

pub fn table_state<S: PokerStorage>(
    manager: &TableManager<S>,
    table_id: TableId,
    viewer: Option<AgentId>,
) -> Result<TableStateDto, ApiError> {
    let table = manager.table(table_id)?;
    let hand = manager.current_hand(table_id)?;
    let names = agent_names(manager);

    Ok(TableStateDto {
        table: build_table_item(&table, &names),
        dealer_button: table.dealer_button,
        hand: hand.map(|h| build_hand_state(&h, viewer, &names)),
    })
}

/// Раздача глазами агента. Если текущей нет, показывается последняя
/// сыгранная (с победителями), если агент в ней участвовал.
pub fn my_hand<S: PokerStorage>(
    manager: &TableManager<S>,
    table_id: TableId,
    agent_id: AgentId,
) -> Result<PlayerHandViewDto, ApiError> {
    let hand = match manager.current_hand(table_id)? {
        Some(h) => h,
        None => manager
            .recent_hands(table_id, 1)
            .into_iter()
            .next()
            .ok_or(EngineError::NoActiveHand)?,
    };
    let idx = hand
        .player_index(agent_id)
        .ok_or(EngineError::PlayerNotInHand(agent_id))?;
    let me = &hand.players[idx];
    let names = agent_names(manager);

    Ok(PlayerHandViewDto {
        table_id,
        hand_id: hand.id,
        hand_number: hand.hand_number,
        street: hand.street,
        pot: hand.pot,
        board: card_codes(&hand.board),
        current_bet: hand.current_bet,
        to_call: amount_to_call(&hand, me),
        my_cards: card_codes(&me.hole_cards),
        my_stack: me.stack,
        my_bet: me.current_bet,
        your_turn: hand.turn.index() == Some(idx),
        action_deadline: hand.action_deadline,
        players: build_hand_players(&hand, Some(agent_id), &names),
        valid_actions: valid_actions(&hand, idx),
        last_action: hand.last_action.clone(),
        winners: build_winners(&hand, &names),
    })
}

pub fn leaderboard<S: PokerStorage>(manager: &TableManager<S>, limit: Option<usize>) -> Vec<LeaderboardEntryDto> {
    let mut agents = manager.agents();
    agents.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.name.cmp(&b.name)));
    agents
        .into_iter()
        .take(limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))
        .enumerate()
        .map(|(i, a)| LeaderboardEntryDto {
            rank: i + 1,
            agent_id: a.id,
            win_rate: format_win_rate(&a.stats),
            net_profit: a.stats.net_profit(),
            hands_played: a.stats.hands_played,
            hands_won: a.stats.hands_won,
            balance: a.balance,
            name: a.name,
        })
        .collect()
}

pub fn profile<S: PokerStorage>(manager: &TableManager<S>, name: &str) -> Result<ProfileDto, ApiError> {
    let agent = manager
        .agent_by_name(name)
        .ok_or_else(|| ApiError::NotFound(format!("Агент {name} не найден")))?;
    let tables = manager
        .tables()
        .iter()
        .filter(|t| t.seat_of(agent.id).is_some())
        .map(|t| t.id)
        .collect();
    Ok(build_profile(agent, tables))
}

pub fn heartbeat<S: PokerStorage>(manager: &TableManager<S>, agent_id: AgentId) -> Result<HeartbeatDto, ApiError> {
    let agent = manager.agent(agent_id)?;
    let mut tables = Vec::new();

    for table in manager.tables() {
        let Some(seat) = table.seat_of(agent_id) else {
            continue;
        };
        let Some(occupant) = table.occupant(seat) else {
            continue;
        };
        let hand = manager.current_hand(table.id)?;
        let your_turn = hand
            .as_ref()
            .and_then(|h| h.current_player())
            .is_some_and(|p| p.agent_id == agent_id);

        tables.push(HeartbeatTableDto {
            table_id: table.id,
            table_name: table.name.clone(),
            seat_index: seat,
            stack: occupant.stack,
            sitting_out: occupant.sitting_out,
            status: table.status,
            hand_id: hand.as_ref().map(|h| h.id),
            your_turn,
            action_deadline: hand.as_ref().filter(|_| your_turn).and_then(|h| h.action_deadline),
        });
    }

    Ok(HeartbeatDto {
        agent_id,
        balance: agent.balance,
        has_pending_action: tables.iter().any(|t| t.your_turn),
        tables,
    })
}

/// Последние завершённые раздачи стола, новые первыми.
pub fn hand_history<S: PokerStorage>(
    manager: &TableManager<S>,
    table_id: TableId,
    limit: Option<usize>,
) -> Result<Vec<HandHistoryItemDto>, ApiError> {
    manager.table(table_id)?;
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let names = agent_names(manager);

    // В выборку может попасть идущая раздача, поэтому берём на одну больше.
    Ok(manager
        .recent_hands(table_id, limit + 1)
        .iter()
        .filter(|h| h.is_complete())
        .take(limit)
        .map(|h| HandHistoryItemDto {
            hand_id: h.id,
            hand_number: h.hand_number,
            pot: h.pot,
            board: card_codes(&h.board),
            winners: build_winners(h, &names),
            reached_showdown: h.reached_showdown,
            completed_at: h.completed_at,
        })
        .collect())
}

/// Журнал действий раздачи в порядке времени.
pub fn hand_actions<S: PokerStorage>(
    manager: &TableManager<S>,
    hand_id: HandId,
) -> Result<Vec<ActionLogItemDto>, ApiError> {
    manager.hand(hand_id)?;
    let names = agent_names(manager);
    Ok(manager
        .hand_actions(hand_id)
        .into_iter()
        .map(|e| ActionLogItemDto {
            street: e.street,
            agent_id: e.agent_id,
            agent_name: name_of(&names, e.agent_id),
            kind: e.kind,
            amount: e.amount,
            source: e.source,
            at: e.at,
        })
        .collect())
}

pub fn format_win_rate(stats: &AgentStats) -> String {
    match stats.win_rate_percent() {
        Some(rate) => format!("{rate:.1}%"),
        None => "N/A".to_string(),
    }
}

pub fn build_profile(agent: Agent, tables: Vec<TableId>) -> ProfileDto {
    ProfileDto {
        agent_id: agent.id,
        win_rate: format_win_rate(&agent.stats),
        net_profit: agent.stats.net_profit(),
        hands_played: agent.stats.hands_played,
        hands_won: agent.stats.hands_won,
        total_winnings: agent.stats.total_winnings,
        total_losses: agent.stats.total_losses,
        balance: agent.balance,
        created_at: agent.created_at,
        description: agent.description,
        name: agent.name,
        tables,
    }
}

fn agent_names<S: PokerStorage>(manager: &TableManager<S>) -> HashMap<AgentId, String> {
    manager.agents().into_iter().map(|a| (a.id, a.name)).collect()
}

fn name_of(names: &HashMap<AgentId, String>, id: AgentId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| format!("agent-{id}"))
}

fn build_table_item(table: &Table, names: &HashMap<AgentId, String>) -> TableListItemDto {
    let seats = table
        .seats
        .iter()
        .enumerate()
        .filter_map(|(idx, seat)| {
            seat.as_ref().map(|o| SeatDto {
                seat_index: idx as u8,
                agent_id: o.agent_id,
                agent_name: name_of(names, o.agent_id),
                stack: o.stack,
                sitting_out: o.sitting_out,
            })
        })
        .collect::<Vec<_>>();

    TableListItemDto {
        table_id: table.id,
        name: table.name.clone(),
        status: table.status,
        seated: seats.len(),
        max_seats: table.max_seats(),
        blinds: format!("{}/{}", table.small_blind(), table.big_blind()),
        min_buy_in: table.config.min_buy_in,
        max_buy_in: table.config.max_buy_in,
        seats,
        frozen: table.is_frozen(),
    }
}

fn build_hand_players(
    hand: &Hand,
    viewer: Option<AgentId>,
    names: &HashMap<AgentId, String>,
) -> Vec<HandPlayerDto> {
    hand.players
        .iter()
        .map(|p| HandPlayerDto {
            agent_id: p.agent_id,
            agent_name: name_of(names, p.agent_id),
            seat_index: p.seat_index,
            stack: p.stack,
            current_bet: p.current_bet,
            total_bet: p.total_bet,
            folded: p.folded,
            all_in: p.all_in,
            hole_cards: can_see_cards(hand, p, viewer).then(|| card_codes(&p.hole_cards)),
        })
        .collect()
}

fn build_winners(hand: &Hand, names: &HashMap<AgentId, String>) -> Vec<WinnerDto> {
    hand.winners
        .iter()
        .map(|w| WinnerDto {
            agent_id: w.agent_id,
            agent_name: name_of(names, w.agent_id),
            amount: w.amount,
            hand_description: w.hand_description.clone(),
        })
        .collect()
}

fn build_hand_state(hand: &Hand, viewer: Option<AgentId>, names: &HashMap<AgentId, String>) -> HandStateDto {
    HandStateDto {
        hand_id: hand.id,
        hand_number: hand.hand_number,
        street: hand.street,
        board: card_codes(&hand.board),
        pot: hand.pot,
        current_bet: hand.current_bet,
        dealer_seat: hand.dealer_seat,
        current_seat: hand.current_player().map(|p| p.seat_index),
        action_deadline: hand.action_deadline,
        players: build_hand_players(hand, viewer, names),
        side_pots: hand.side_pots.clone(),
        last_action: hand.last_action.clone(),
        winners: build_winners(hand, names),
        reached_showdown: hand.reached_showdown,
    }
}
