// src/time_ctrl/autostart.rs
//! Автостарт: раздача начинается на каждом столе в `between_hands`
//! с двумя и более готовыми игроками после паузы между раздачами.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::table::{Table, TableStatus};
use crate::domain::Timestamp;
use crate::engine::errors::EngineError;
use crate::engine::table_manager::TableManager;
use crate::infra::persistence::PokerStorage;
use crate::time_ctrl::TimeRules;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutostartReport {
    pub started: usize,
    /// Стол уже занят другой раздачей или изменился между чтением и записью.
    pub raced: usize,
    pub failed: usize,
}

/// Можно ли стартовать раздачу на столе прямо сейчас.
pub fn ready_for_autostart(table: &Table, now: Timestamp, rules: &TimeRules) -> bool {
    if table.is_frozen() || table.current_hand_id.is_some() {
        return false;
    }
    if table.status != TableStatus::BetweenHands || table.eligible_count() < 2 {
        return false;
    }
    table
        .last_hand_completed_at
        .map_or(true, |done| now >= done.saturating_add(rules.autostart_delay_ms))
}

pub fn autostart_pass<S: PokerStorage>(manager: &TableManager<S>, now: Timestamp) -> AutostartReport {
    let rules = &manager.config().time;
    let mut report = AutostartReport::default();

    for table in manager.tables() {
        if !ready_for_autostart(&table, now, rules) {
            continue;
        }
        match manager.start_hand(table.id, now) {
            Ok(hand) => {
                debug!(table_id = table.id, hand_id = hand.id, "автостарт раздачи");
                report.started += 1;
            }
            Err(e) if e.is_conflict() || e == EngineError::NotEnoughPlayers => {
                debug!(table_id = table.id, error = %e, "автостарт проиграл гонку");
                report.raced += 1;
            }
            Err(e) => {
                warn!(table_id = table.id, error = %e, "автостарт не удался");
                report.failed += 1;
            }
        }
    }
    report
}
