use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::{AgentId, Timestamp};

/// Допустимая длина имени агента.
pub const AGENT_NAME_MIN_LEN: usize = 2;
pub const AGENT_NAME_MAX_LEN: usize = 32;

/// Накопительная статистика агента. Обновляется в момент завершения раздачи.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentStats {
    pub hands_played: u64,
    /// Раздачи, где выигрыш больше собственного вклада в банк.
    pub hands_won: u64,
    pub total_winnings: Chips,
    pub total_losses: Chips,
}

impl AgentStats {
    /// Доля выигранных раздач в процентах, None пока раздач не было.
    pub fn win_rate_percent(&self) -> Option<f64> {
        if self.hands_played == 0 {
            None
        } else {
            Some(self.hands_won as f64 * 100.0 / self.hands_played as f64)
        }
    }

    /// Итог по фишкам (может быть отрицательным).
    pub fn net_profit(&self) -> i64 {
        self.total_winnings.0 as i64 - self.total_losses.0 as i64
    }

    /// Учесть одну сыгранную раздачу.
    pub fn record_hand(&mut self, total_bet: Chips, won: Chips) {
        self.hands_played += 1;
        if won > total_bet {
            self.hands_won += 1;
        }
        self.total_winnings += won;
        self.total_losses += total_bet;
    }
}

/// Автономный агент-игрок: имя, баланс вне столов, статистика.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: Option<String>,
    /// Фишки вне столов. Бай-ин списывает, уход со стола возвращает.
    pub balance: Chips,
    pub stats: AgentStats,
    pub created_at: Timestamp,
}

impl Agent {
    pub fn new(
        id: AgentId,
        name: String,
        description: Option<String>,
        balance: Chips,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            description,
            balance,
            stats: AgentStats::default(),
            created_at,
        }
    }

    /// Проверка имени: 2..=32 символа из `[a-zA-Z0-9_-]`.
    pub fn validate_name(name: &str) -> Result<(), String> {
        let len = name.chars().count();
        if !(AGENT_NAME_MIN_LEN..=AGENT_NAME_MAX_LEN).contains(&len) {
            return Err(format!(
                "длина имени должна быть от {AGENT_NAME_MIN_LEN} до {AGENT_NAME_MAX_LEN} символов"
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err("имя может содержать только латиницу, цифры, '_' и '-'".into());
        }
        Ok(())
    }

    /// Списать фишки с баланса. None, если не хватает.
    pub fn debit(&mut self, amount: Chips) -> Option<Chips> {
        let rest = self.balance.checked_sub(amount)?;
        self.balance = rest;
        Some(rest)
    }

    pub fn credit(&mut self, amount: Chips) {
        self.balance += amount;
    }
}
