use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::chips::Chips;
use crate::domain::table::{SeatIndex, TableConfig};
use crate::domain::{AgentId, TableId, Timestamp};
use crate::engine::actions::{ActionKind, PlayerAction};
use crate::engine::table_manager::TableManager;
use crate::infra::persistence::PokerStorage;

use super::dto::CommandResponse;
use super::errors::ApiError;

/// Команда верхнего уровня.
///
/// Транспорт (HTTP, очередь) и аутентификация живут снаружи: сюда
/// приходят команды уже от опознанного агента.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    RegisterAgent {
        name: String,
        description: Option<String>,
    },

    CreateTable(CreateTableCommand),

    /// Сесть за стол. Без `seat` – первое свободное место.
    JoinTable {
        table_id: TableId,
        agent_id: AgentId,
        buy_in: u64,
        seat: Option<SeatIndex>,
    },

    LeaveTable { table_id: TableId, agent_id: AgentId },

    Rebuy {
        table_id: TableId,
        agent_id: AgentId,
        amount: u64,
    },

    ToggleSitOut { table_id: TableId, agent_id: AgentId },

    StartHand { table_id: TableId },

    /// Действие в текущей раздаче стола. Для bet/raise `amount` – ставка "до".
    Act {
        table_id: TableId,
        agent_id: AgentId,
        action: ActionKind,
        amount: Option<u64>,
    },

    /// Операторские команды.
    FreezeTable { table_id: TableId, reason: String },
    UnfreezeTable { table_id: TableId },
}

/// Команда создания стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTableCommand {
    /// Имя стола (отображается в лобби).
    pub name: String,
    /// Количество мест (2–9).
    pub max_seats: u8,
    pub small_blind: u64,
    pub big_blind: u64,
    pub min_buy_in: u64,
    pub max_buy_in: u64,
}

impl CreateTableCommand {
    pub fn to_config(&self) -> TableConfig {
        TableConfig::new(
            self.max_seats,
            self.small_blind,
            self.big_blind,
            self.min_buy_in,
            self.max_buy_in,
        )
    }
}

/// Выполнить команду. Отказы движка возвращаются дословно.
pub fn execute<S: PokerStorage>(
    manager: &TableManager<S>,
    command: Command,
    now: Timestamp,
) -> Result<CommandResponse, ApiError> {
    let result = dispatch(manager, command, now);
    if let Err(ApiError::Conflict(msg)) = &result {
        warn!(error = %msg, "команда отклонена из-за конфликта");
    }
    result
}

fn dispatch<S: PokerStorage>(
    manager: &TableManager<S>,
    command: Command,
    now: Timestamp,
) -> Result<CommandResponse, ApiError> {
    match command {
        Command::RegisterAgent { name, description } => {
            let agent = manager.register_agent(name.trim(), description, now)?;
            Ok(CommandResponse::AgentRegistered {
                agent_id: agent.id,
                name: agent.name,
                balance: agent.balance,
            })
        }

        Command::CreateTable(cmd) => {
            if cmd.name.trim().is_empty() {
                return Err(ApiError::BadRequest("имя стола не может быть пустым".into()));
            }
            let table = manager.create_table(cmd.name.trim(), cmd.to_config(), now)?;
            Ok(CommandResponse::TableCreated { table_id: table.id })
        }

        Command::JoinTable {
            table_id,
            agent_id,
            buy_in,
            seat,
        } => {
            let seat_index = manager.join_table(table_id, agent_id, Chips(buy_in), seat)?;
            Ok(CommandResponse::Seated { seat_index })
        }

        Command::LeaveTable { table_id, agent_id } => {
            let refund = manager.leave_table(table_id, agent_id)?;
            Ok(CommandResponse::Left { refund })
        }

        Command::Rebuy {
            table_id,
            agent_id,
            amount,
        } => {
            let stack = manager.rebuy(table_id, agent_id, Chips(amount))?;
            Ok(CommandResponse::Rebought { stack })
        }

        Command::ToggleSitOut { table_id, agent_id } => {
            let sitting_out = manager.toggle_sit_out(table_id, agent_id)?;
            Ok(CommandResponse::SitOut { sitting_out })
        }

        Command::StartHand { table_id } => {
            let hand = manager.start_hand(table_id, now)?;
            Ok(CommandResponse::HandStarted {
                hand_id: hand.id,
                hand_number: hand.hand_number,
            })
        }

        Command::Act {
            table_id,
            agent_id,
            action,
            amount,
        } => {
            let action = PlayerAction::new(agent_id, action, amount.map(Chips));
            let status = manager.act_at_table(table_id, action, now)?;
            Ok(CommandResponse::ActionApplied { status })
        }

        Command::FreezeTable { table_id, reason } => {
            manager.freeze_table(table_id, &reason)?;
            Ok(CommandResponse::Ok)
        }

        Command::UnfreezeTable { table_id } => {
            manager.unfreeze_table(table_id)?;
            Ok(CommandResponse::Ok)
        }
    }
}
