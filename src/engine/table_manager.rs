// src/engine/table_manager.rs

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::domain::agent::Agent;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::hand::Hand;
use crate::domain::table::{SeatIndex, Table, TableConfig};
use crate::domain::{AgentId, HandId, TableId, Timestamp};
use crate::engine::actions::{ActionKind, ActionSource, PlayerAction};
use crate::engine::betting::amount_to_call;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::{self, HandStatus};
use crate::engine::hand_history::{ActionLog, ActionLogEntry};
use crate::engine::recovery::{diagnose, RecoveryAction, RecoveryOutcome};
use crate::engine::seating;
use crate::infra::ids::IdGenerator;
use crate::infra::persistence::{PokerStorage, Versioned, WriteSet};
use crate::infra::rng::SystemRng;

/// Менеджер столов:
/// - читает столы, раздачи и агентов из хранилища вместе с версиями;
/// - прогоняет чистые операции движка над копиями;
/// - фиксирует результат одним `WriteSet` с ожидаемыми версиями.
///
/// Никаких блокировок между операциями: из двух гонящихся запросов к одной
/// записи проходит один, второй получает `EngineError::Conflict`.
pub struct TableManager<S: PokerStorage> {
    store: Arc<S>,
    ids: IdGenerator,
    config: EngineConfig,
}

impl<S: PokerStorage> TableManager<S> {
    /// Счётчики id продолжаются с максимальных значений в хранилище.
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let max = store.max_ids();
        Self {
            store,
            ids: IdGenerator::starting_after(max.table, max.hand, max.agent),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ------------------------------------------------------------------
    // Агенты и столы
    // ------------------------------------------------------------------

    /// Зарегистрировать агента со стартовым балансом из конфига.
    pub fn register_agent(
        &self,
        name: &str,
        description: Option<String>,
        now: Timestamp,
    ) -> Result<Agent, EngineError> {
        Agent::validate_name(name).map_err(EngineError::InvalidAgentName)?;
        if self.store.find_agent_by_name(name).is_some() {
            return Err(EngineError::AgentNameTaken(name.to_string()));
        }

        let agent = Agent::new(
            self.ids.next_agent_id(),
            name.to_string(),
            description,
            self.config.starting_balance,
            now,
        );
        let mut ws = WriteSet::new();
        ws.put_agent(None, agent.clone());
        self.store.commit(ws)?;

        info!(agent_id = agent.id, name = %agent.name, "агент зарегистрирован");
        Ok(agent)
    }

    pub fn create_table(
        &self,
        name: &str,
        config: TableConfig,
        now: Timestamp,
    ) -> Result<Table, EngineError> {
        config.validate().map_err(EngineError::InvalidTableConfig)?;
        let table = Table::new(self.ids.next_table_id(), name.to_string(), config, now);

        let mut ws = WriteSet::new();
        ws.put_table(None, table.clone());
        self.store.commit(ws)?;

        info!(table_id = table.id, name = %table.name, "стол создан");
        Ok(table)
    }

    /// Создать столы по умолчанию, если в хранилище ещё нет ни одного.
    pub fn seed_default_tables(&self, now: Timestamp) -> Result<Vec<Table>, EngineError> {
        if !self.store.list_tables().is_empty() {
            return Ok(Vec::new());
        }
        let defaults = [
            ("The Lobby", TableConfig::new(6, 1, 2, 20, 100)),
            ("High Rollers", TableConfig::new(6, 5, 10, 100, 500)),
            ("Heads Up", TableConfig::new(2, 2, 4, 40, 200)),
        ];
        defaults
            .into_iter()
            .map(|(name, config)| self.create_table(name, config, now))
            .collect()
    }

    // ------------------------------------------------------------------
    // Места
    // ------------------------------------------------------------------

    pub fn join_table(
        &self,
        table_id: TableId,
        agent_id: AgentId,
        buy_in: Chips,
        seat: Option<SeatIndex>,
    ) -> Result<SeatIndex, EngineError> {
        let t = self.load_table(table_id)?;
        ensure_not_frozen(&t.value)?;
        let a = self.load_agent(agent_id)?;
        let hand = self.load_current_hand(&t.value);

        let mut table = t.value.clone();
        let mut agent = a.value.clone();
        let seat = seating::join(&mut table, hand.as_ref(), &mut agent, buy_in, seat)?;

        let mut ws = WriteSet::new();
        ws.put_table(Some(t.version), table)
            .put_agent(Some(a.version), agent);
        self.store.commit(ws)?;
        Ok(seat)
    }

    pub fn leave_table(&self, table_id: TableId, agent_id: AgentId) -> Result<Chips, EngineError> {
        let t = self.load_table(table_id)?;
        ensure_not_frozen(&t.value)?;
        let a = self.load_agent(agent_id)?;
        let hand = self.load_current_hand(&t.value);

        let mut table = t.value.clone();
        let mut agent = a.value.clone();
        let refund = seating::leave(&mut table, hand.as_ref(), &mut agent)?;

        let mut ws = WriteSet::new();
        ws.put_table(Some(t.version), table)
            .put_agent(Some(a.version), agent);
        self.store.commit(ws)?;
        Ok(refund)
    }

    /// Докупка. Возвращает новый стек.
    pub fn rebuy(&self, table_id: TableId, agent_id: AgentId, amount: Chips) -> Result<Chips, EngineError> {
        let t = self.load_table(table_id)?;
        ensure_not_frozen(&t.value)?;
        let a = self.load_agent(agent_id)?;

        let mut table = t.value.clone();
        let mut agent = a.value.clone();
        let in_progress = table.current_hand_id.is_some();
        let stack = seating::rebuy(&mut table, in_progress, &mut agent, amount)?;

        let mut ws = WriteSet::new();
        ws.put_table(Some(t.version), table)
            .put_agent(Some(a.version), agent);
        self.store.commit(ws)?;
        Ok(stack)
    }

    pub fn toggle_sit_out(&self, table_id: TableId, agent_id: AgentId) -> Result<bool, EngineError> {
        let t = self.load_table(table_id)?;
        let mut table = t.value.clone();
        let sitting_out = seating::toggle_sit_out(&mut table, agent_id)?;

        let mut ws = WriteSet::new();
        ws.put_table(Some(t.version), table);
        self.store.commit(ws)?;
        Ok(sitting_out)
    }

    /// Снять со стола агента, ушедшего в sit-out по таймаутам. Стек уходит на баланс.
    pub fn remove_unresponsive(&self, table_id: TableId, agent_id: AgentId) -> Result<Chips, EngineError> {
        let t = self.load_table(table_id)?;
        let a = self.load_agent(agent_id)?;

        let mut table = t.value.clone();
        let mut agent = a.value.clone();
        let refund = seating::remove_unresponsive(
            &mut table,
            &mut agent,
            self.config.time.max_consecutive_timeouts,
        )?;

        let mut ws = WriteSet::new();
        ws.put_table(Some(t.version), table)
            .put_agent(Some(a.version), agent);
        self.store.commit(ws)?;
        Ok(refund)
    }

    // ------------------------------------------------------------------
    // Раздачи
    // ------------------------------------------------------------------

    /// Начать раздачу. Колода тасуется seed-ом раздачи, если он задан
    /// в конфиге, иначе системным RNG.
    pub fn start_hand(&self, table_id: TableId, now: Timestamp) -> Result<Hand, EngineError> {
        let t = self.load_table(table_id)?;
        let mut table = t.value.clone();
        let hand_id = self.ids.next_hand_id();
        let rules = &self.config.time;

        let hand = match self.config.seed() {
            Some(seed) => {
                let mut rng = seed.derive(table.id, hand_id, table.hands_dealt + 1).to_rng();
                game_loop::start_hand(&mut table, &mut rng, hand_id, now, rules)?
            }
            None => game_loop::start_hand(&mut table, &mut SystemRng, hand_id, now, rules)?,
        };
        self.commit_new_hand(t.version, table, hand)
    }

    /// Начать раздачу заранее подготовленной колодой.
    pub fn start_hand_with_deck(
        &self,
        table_id: TableId,
        deck: Deck,
        now: Timestamp,
    ) -> Result<Hand, EngineError> {
        let t = self.load_table(table_id)?;
        let mut table = t.value.clone();
        let hand_id = self.ids.next_hand_id();
        let hand = game_loop::start_hand_with_deck(&mut table, deck, hand_id, now, &self.config.time)?;
        self.commit_new_hand(t.version, table, hand)
    }

    /// Применить действие к раздаче.
    pub fn apply_action(
        &self,
        hand_id: HandId,
        action: PlayerAction,
        now: Timestamp,
    ) -> Result<HandStatus, EngineError> {
        let h = self.load_hand(hand_id)?;
        self.apply_loaded(h, &action, now)
    }

    /// Действие в текущей раздаче стола.
    pub fn act_at_table(
        &self,
        table_id: TableId,
        action: PlayerAction,
        now: Timestamp,
    ) -> Result<HandStatus, EngineError> {
        let table = self.load_table(table_id)?.value;
        let hand_id = table.current_hand_id.ok_or(EngineError::NoActiveHand)?;
        self.apply_action(hand_id, action, now)
    }

    /// Принудительный ход за агента, у которого истёк дедлайн:
    /// check, если он бесплатен, иначе fold.
    ///
    /// Повторный вызов для уже решённого хода отклоняется
    /// (`NotPlayersTurn`, `HandComplete` или конфликт версий).
    pub fn force_timeout(
        &self,
        hand_id: HandId,
        expected_agent: AgentId,
        now: Timestamp,
    ) -> Result<(ActionKind, HandStatus), EngineError> {
        let h = self.load_hand(hand_id)?;
        if h.value.is_complete() {
            return Err(EngineError::HandComplete);
        }
        let current = h
            .value
            .current_player()
            .filter(|p| p.agent_id == expected_agent)
            .ok_or(EngineError::NotPlayersTurn(expected_agent))?;
        if !h.value.is_past_deadline(now) {
            return Err(EngineError::DeadlineNotReached);
        }

        let action = timeout_action(&h.value, current.agent_id);
        let kind = action.kind;
        let status = self.apply_loaded(h, &action, now)?;
        info!(hand_id, agent_id = expected_agent, kind = %kind, "ход сделан по таймауту");
        Ok((kind, status))
    }

    // ------------------------------------------------------------------
    // Восстановление
    // ------------------------------------------------------------------

    /// Проверить стол и его раздачу, исправить то, что исправимо,
    /// иначе заморозить стол до ручного разбора.
    pub fn reconcile_table(&self, table_id: TableId, now: Timestamp) -> Result<RecoveryOutcome, EngineError> {
        let t = self.load_table(table_id)?;
        if t.value.is_frozen() {
            return Ok(RecoveryOutcome::AlreadyFrozen);
        }
        let h = t.value.current_hand_id.and_then(|id| self.store.load_hand(id));

        match diagnose(&t.value, h.as_ref().map(|h| &h.value)) {
            RecoveryAction::Nothing => Ok(RecoveryOutcome::Healthy),
            RecoveryAction::RepairStatus(status) => {
                let mut table = t.value.clone();
                info!(table_id, from = ?table.status, to = ?status, "статус стола исправлен");
                table.status = status;
                self.commit_table(t.version, table)?;
                Ok(RecoveryOutcome::StatusRepaired)
            }
            RecoveryAction::ClearMissingHand => {
                let mut table = t.value.clone();
                warn!(table_id, hand_id = ?table.current_hand_id, "раздача стола не найдена, ссылка снята");
                table.current_hand_id = None;
                table.status = table.resting_status();
                self.commit_table(t.version, table)?;
                Ok(RecoveryOutcome::ClearedMissingHand)
            }
            RecoveryAction::ResettleCompleteHand => {
                let Some(h) = h else {
                    return Ok(RecoveryOutcome::Healthy);
                };
                let mut table = t.value.clone();
                let completed_at = h.value.completed_at.unwrap_or(now);
                seating::settle_after_hand(&mut table, &h.value, completed_at);
                warn!(table_id, hand_id = h.value.id, "стеки завершённой раздачи сверены повторно");
                self.commit_table(t.version, table)?;
                Ok(RecoveryOutcome::ResettledCompleteHand)
            }
            RecoveryAction::ForceRunout => {
                let Some(h) = h else {
                    return Ok(RecoveryOutcome::Healthy);
                };
                let mut table = t.value.clone();
                let mut hand = h.value.clone();
                match game_loop::force_runout(&mut table, &mut hand, now) {
                    Ok(()) => {
                        warn!(table_id, hand_id = hand.id, "зависшая раздача доиграна принудительно");
                        self.commit_hand(&t, table, h.version, hand, ActionLog::new())?;
                        Ok(RecoveryOutcome::ForcedRunout)
                    }
                    Err(e) if e.is_integrity() => self.freeze(t, e.to_string()),
                    Err(e) => Err(e),
                }
            }
            RecoveryAction::Freeze(reason) => self.freeze(t, reason),
        }
    }

    /// Заморозить стол вручную.
    pub fn freeze_table(&self, table_id: TableId, reason: &str) -> Result<(), EngineError> {
        let t = self.load_table(table_id)?;
        self.freeze(t, reason.to_string()).map(|_| ())
    }

    /// Снять заморозку. Следующий проход sweeper-а проверит стол заново.
    pub fn unfreeze_table(&self, table_id: TableId) -> Result<(), EngineError> {
        let t = self.load_table(table_id)?;
        let mut table = t.value.clone();
        if table.frozen_reason.take().is_none() {
            return Ok(());
        }
        self.commit_table(t.version, table)?;
        info!(table_id, "стол разморожен");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Чтение
    // ------------------------------------------------------------------

    pub fn table(&self, table_id: TableId) -> Result<Table, EngineError> {
        self.load_table(table_id).map(|t| t.value)
    }

    pub fn hand(&self, hand_id: HandId) -> Result<Hand, EngineError> {
        self.load_hand(hand_id).map(|h| h.value)
    }

    pub fn agent(&self, agent_id: AgentId) -> Result<Agent, EngineError> {
        self.load_agent(agent_id).map(|a| a.value)
    }

    pub fn agent_by_name(&self, name: &str) -> Option<Agent> {
        self.store.find_agent_by_name(name).map(|a| a.value)
    }

    /// Текущая раздача стола, если она есть.
    pub fn current_hand(&self, table_id: TableId) -> Result<Option<Hand>, EngineError> {
        let table = self.load_table(table_id)?.value;
        Ok(self.load_current_hand(&table))
    }

    pub fn tables(&self) -> Vec<Table> {
        self.store.list_tables().into_iter().map(|t| t.value).collect()
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.store.list_agents().into_iter().map(|a| a.value).collect()
    }

    pub fn open_hands(&self) -> Vec<Hand> {
        self.store.open_hands().into_iter().map(|h| h.value).collect()
    }

    pub fn recent_hands(&self, table_id: TableId, limit: usize) -> Vec<Hand> {
        self.store.recent_hands(table_id, limit)
    }

    pub fn hand_actions(&self, hand_id: HandId) -> Vec<ActionLogEntry> {
        let mut entries = self.store.actions_for_hand(hand_id);
        entries.sort_by_key(|e| e.at);
        entries
    }

    // ------------------------------------------------------------------
    // Внутреннее
    // ------------------------------------------------------------------

    fn load_table(&self, id: TableId) -> Result<Versioned<Table>, EngineError> {
        self.store.load_table(id).ok_or(EngineError::TableNotFound(id))
    }

    fn load_hand(&self, id: HandId) -> Result<Versioned<Hand>, EngineError> {
        self.store.load_hand(id).ok_or(EngineError::HandNotFound(id))
    }

    fn load_agent(&self, id: AgentId) -> Result<Versioned<Agent>, EngineError> {
        self.store.load_agent(id).ok_or(EngineError::AgentNotFound(id))
    }

    fn load_current_hand(&self, table: &Table) -> Option<Hand> {
        table
            .current_hand_id
            .and_then(|id| self.store.load_hand(id))
            .map(|h| h.value)
    }

    /// Применить действие к уже прочитанной версии раздачи и зафиксировать.
    fn apply_loaded(
        &self,
        h: Versioned<Hand>,
        action: &PlayerAction,
        now: Timestamp,
    ) -> Result<HandStatus, EngineError> {
        if h.value.is_complete() {
            return Err(EngineError::HandComplete);
        }
        let t = self.load_table(h.value.table_id)?;
        ensure_not_frozen(&t.value)?;
        if t.value.current_hand_id != Some(h.value.id) {
            return Err(EngineError::Integrity(format!(
                "стол {} не ссылается на раздачу {}",
                t.value.id, h.value.id
            )));
        }

        let mut table = t.value.clone();
        let mut hand = h.value.clone();
        let mut log = ActionLog::new();
        let status = game_loop::apply_action(&mut table, &mut hand, action, now, &self.config.time, &mut log)?;
        self.commit_hand(&t, table, h.version, hand, log)?;
        Ok(status)
    }

    fn commit_new_hand(&self, table_version: u64, table: Table, hand: Hand) -> Result<Hand, EngineError> {
        let mut ws = WriteSet::new();
        ws.put_table(Some(table_version), table);
        if hand.is_complete() {
            self.stage_stats(&mut ws, &hand);
        }
        ws.put_hand(None, hand.clone());
        self.store.commit(ws)?;
        Ok(hand)
    }

    /// Записать раздачу, стол (если изменился), журнал и, для завершённой
    /// раздачи, статистику агентов. Всё одним коммитом.
    fn commit_hand(
        &self,
        original: &Versioned<Table>,
        table: Table,
        hand_version: u64,
        hand: Hand,
        log: ActionLog,
    ) -> Result<(), EngineError> {
        let mut ws = WriteSet::new();
        if table != original.value {
            ws.put_table(Some(original.version), table);
        }
        if hand.is_complete() {
            self.stage_stats(&mut ws, &hand);
        }
        ws.append_actions(log.into_entries());
        ws.put_hand(Some(hand_version), hand);
        self.store.commit(ws).map_err(|e| {
            debug!(error = %e, "коммит раздачи отклонён");
            EngineError::from(e)
        })
    }

    fn stage_stats(&self, ws: &mut WriteSet, hand: &Hand) {
        for p in &hand.players {
            match self.store.load_agent(p.agent_id) {
                Some(a) => {
                    let mut agent = a.value;
                    seating::record_hand_stats(&mut agent, hand);
                    ws.put_agent(Some(a.version), agent);
                }
                None => warn!(agent_id = p.agent_id, hand_id = hand.id, "агент раздачи не найден, статистика пропущена"),
            }
        }
    }

    fn commit_table(&self, version: u64, table: Table) -> Result<(), EngineError> {
        let mut ws = WriteSet::new();
        ws.put_table(Some(version), table);
        self.store.commit(ws)?;
        Ok(())
    }

    fn freeze(&self, t: Versioned<Table>, reason: String) -> Result<RecoveryOutcome, EngineError> {
        let mut table = t.value;
        error!(table_id = table.id, reason = %reason, "стол заморожен");
        table.frozen_reason = Some(reason.clone());
        self.commit_table(t.version, table)?;
        Ok(RecoveryOutcome::Frozen(reason))
    }
}

/// Действие по умолчанию при истёкшем времени.
pub fn timeout_action(hand: &Hand, agent_id: AgentId) -> PlayerAction {
    let free = hand
        .player(agent_id)
        .map_or(false, |p| amount_to_call(hand, p).is_zero());
    let action = if free {
        PlayerAction::check(agent_id)
    } else {
        PlayerAction::fold(agent_id)
    };
    action.with_source(ActionSource::Timeout)
}

fn ensure_not_frozen(table: &Table) -> Result<(), EngineError> {
    match &table.frozen_reason {
        Some(reason) => Err(EngineError::TableFrozen {
            table_id: table.id,
            reason: reason.clone(),
        }),
        None => Ok(()),
    }
}
