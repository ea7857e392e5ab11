// src/time_ctrl/time_rules.rs
//! Правила тайминга: время на ход, grace-окно, пауза между раздачами.
//!
//! Здесь только "правила", без состояния и без привязки к конкретному столу.

use serde::{Deserialize, Serialize};

/// Правила тайминга для всех столов движка. Все значения в миллисекундах.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRules {
    /// Сколько даётся на одно решение.
    pub action_timeout_ms: u64,
    /// Окно после дедлайна, в котором действие игрока ещё принимается.
    pub grace_ms: u64,
    /// Пауза между концом раздачи и автостартом следующей.
    pub autostart_delay_ms: u64,
    /// После стольких таймаутов подряд агент уходит в sit-out.
    pub max_consecutive_timeouts: u32,
}

impl TimeRules {
    /// Строгий конструктор.
    pub const fn new(
        action_timeout_ms: u64,
        grace_ms: u64,
        autostart_delay_ms: u64,
        max_consecutive_timeouts: u32,
    ) -> Self {
        Self {
            action_timeout_ms,
            grace_ms,
            autostart_delay_ms,
            max_consecutive_timeouts,
        }
    }

    /// Стандартный профиль: 30 сек на ход, 2 сек grace, 5 сек между раздачами,
    /// sit-out после двух таймаутов подряд.
    pub const fn standard() -> Self {
        Self::new(30_000, 2_000, 5_000, 2)
    }
}

impl Default for TimeRules {
    fn default() -> Self {
        Self::standard()
    }
}
