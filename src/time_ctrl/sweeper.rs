// src/time_ctrl/sweeper.rs
//! Один проход sweeper-а:
//!   1. ходы с истёкшим дедлайном делаются принудительно (check или fold);
//!   2. каждый стол проверяется на согласованность;
//!   3. агенты в sit-out по таймаутам снимаются со столов между раздачами.
//!
//! Проход ничего не ждёт и не повторяет: проигранная гонка просто
//! откладывает работу до следующего тика.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::domain::Timestamp;
use crate::engine::errors::EngineError;
use crate::engine::recovery::RecoveryOutcome;
use crate::engine::table_manager::TableManager;
use crate::infra::persistence::PokerStorage;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepReport {
    /// Принудительных ходов.
    pub forced: usize,
    /// Ход уже решён кем-то другим или запись изменилась под нами.
    pub stale: usize,
    /// Агентов снято со столов.
    pub removed: usize,
    /// Столов, приведённых в порядок.
    pub recovered: usize,
    /// Столов, замороженных в этом проходе.
    pub frozen: usize,
    pub errors: usize,
}

impl SweepReport {
    pub fn is_quiet(&self) -> bool {
        *self == Self::default()
    }
}

pub fn sweep_pass<S: PokerStorage>(manager: &TableManager<S>, now: Timestamp) -> SweepReport {
    let mut report = SweepReport::default();
    force_expired_turns(manager, now, &mut report);
    reconcile_tables(manager, now, &mut report);
    remove_unresponsive(manager, &mut report);
    report
}

fn force_expired_turns<S: PokerStorage>(manager: &TableManager<S>, now: Timestamp, report: &mut SweepReport) {
    for hand in manager.open_hands() {
        let Some(player) = hand.current_player() else {
            continue;
        };
        if !hand.is_past_deadline(now) {
            continue;
        }
        match manager.force_timeout(hand.id, player.agent_id, now) {
            Ok(_) => report.forced += 1,
            Err(e) if is_stale(&e) => {
                debug!(hand_id = hand.id, agent_id = player.agent_id, error = %e, "таймаут уже неактуален");
                report.stale += 1;
            }
            Err(e) => {
                log_failure(&e, hand.table_id, "не удалось сделать ход по таймауту");
                report.errors += 1;
            }
        }
    }
}

fn reconcile_tables<S: PokerStorage>(manager: &TableManager<S>, now: Timestamp, report: &mut SweepReport) {
    for table in manager.tables() {
        match manager.reconcile_table(table.id, now) {
            Ok(RecoveryOutcome::Healthy | RecoveryOutcome::AlreadyFrozen) => {}
            Ok(RecoveryOutcome::Frozen(_)) => report.frozen += 1,
            Ok(outcome) => {
                info!(table_id = table.id, ?outcome, "стол восстановлен");
                report.recovered += 1;
            }
            Err(e) if e.is_conflict() => report.stale += 1,
            Err(e) => {
                log_failure(&e, table.id, "проверка стола не удалась");
                report.errors += 1;
            }
        }
    }
}

fn remove_unresponsive<S: PokerStorage>(manager: &TableManager<S>, report: &mut SweepReport) {
    let max_timeouts = manager.config().time.max_consecutive_timeouts;
    for table in manager.tables() {
        if table.current_hand_id.is_some() || table.is_frozen() {
            continue;
        }
        let stale: Vec<_> = table
            .seats
            .iter()
            .flatten()
            .filter(|o| o.sitting_out && o.consecutive_timeouts >= max_timeouts)
            .map(|o| o.agent_id)
            .collect();
        for agent_id in stale {
            match manager.remove_unresponsive(table.id, agent_id) {
                Ok(refund) => {
                    info!(table_id = table.id, agent_id, refund = refund.0, "неотвечающий агент снят");
                    report.removed += 1;
                }
                Err(e) if e.is_conflict() => report.stale += 1,
                Err(e) => {
                    log_failure(&e, table.id, "не удалось снять агента");
                    report.errors += 1;
                }
            }
        }
    }
}

fn is_stale(e: &EngineError) -> bool {
    e.is_conflict()
        || matches!(
            e,
            EngineError::NotPlayersTurn(_) | EngineError::HandComplete | EngineError::DeadlineNotReached
        )
}

fn log_failure(e: &EngineError, table_id: u64, msg: &str) {
    if e.is_integrity() {
        error!(table_id, error = %e, "{msg}");
    } else {
        warn!(table_id, error = %e, "{msg}");
    }
}
