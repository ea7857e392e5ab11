use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{AgentId, Chips};

/// Тип действия игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    /// Bet на улице без ставки.
    Bet,
    /// Raise существующей ставки.
    Raise,
    /// Поставить весь стек.
    AllIn,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "all-in",
        }
    }

    /// Требуется ли явная сумма.
    pub fn needs_amount(self) -> bool {
        matches!(self, ActionKind::Bet | ActionKind::Raise)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fold" => Ok(ActionKind::Fold),
            "check" => Ok(ActionKind::Check),
            "call" => Ok(ActionKind::Call),
            "bet" => Ok(ActionKind::Bet),
            "raise" => Ok(ActionKind::Raise),
            "all-in" | "allin" | "all_in" => Ok(ActionKind::AllIn),
            other => Err(format!("неизвестное действие: {other}")),
        }
    }
}

/// Кто инициировал действие.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    /// Сам агент.
    Player,
    /// Принудительно, по истечении времени хода.
    Timeout,
    /// Принудительно, служебным проходом.
    System,
}

impl ActionSource {
    /// Проверять ли дедлайн хода. Принудительные действия существуют
    /// именно для просроченных ходов, поэтому их не проверяем.
    pub fn checks_deadline(self) -> bool {
        matches!(self, ActionSource::Player)
    }
}

/// Конкретное действие игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAction {
    pub agent_id: AgentId,
    pub kind: ActionKind,
    /// Для bet/raise – сумма "до" (итоговая ставка на улице).
    pub amount: Option<Chips>,
    pub source: ActionSource,
}

impl PlayerAction {
    pub fn new(agent_id: AgentId, kind: ActionKind, amount: Option<Chips>) -> Self {
        Self {
            agent_id,
            kind,
            amount,
            source: ActionSource::Player,
        }
    }

    pub fn fold(agent_id: AgentId) -> Self {
        Self::new(agent_id, ActionKind::Fold, None)
    }

    pub fn check(agent_id: AgentId) -> Self {
        Self::new(agent_id, ActionKind::Check, None)
    }

    pub fn call(agent_id: AgentId) -> Self {
        Self::new(agent_id, ActionKind::Call, None)
    }

    pub fn bet(agent_id: AgentId, to: u64) -> Self {
        Self::new(agent_id, ActionKind::Bet, Some(Chips(to)))
    }

    pub fn raise(agent_id: AgentId, to: u64) -> Self {
        Self::new(agent_id, ActionKind::Raise, Some(Chips(to)))
    }

    pub fn all_in(agent_id: AgentId) -> Self {
        Self::new(agent_id, ActionKind::AllIn, None)
    }

    pub fn with_source(mut self, source: ActionSource) -> Self {
        self.source = source;
        self
    }
}
