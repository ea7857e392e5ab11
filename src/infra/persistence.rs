use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Agent, AgentId, Hand, HandId, Table, TableId};
use crate::engine::hand_history::ActionLogEntry;

/// Запись хранилища вместе с её версией. Версия растёт на 1 при каждой записи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Ошибки хранилища.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("конфликт версий: {entity} {id}, ожидалась {expected:?}, в хранилище {found:?}")]
    VersionConflict {
        entity: &'static str,
        id: u64,
        expected: Option<u64>,
        found: Option<u64>,
    },

    #[error("имя агента уже занято: {0}")]
    DuplicateAgentName(String),

    #[error("ошибка сериализации: {0}")]
    Serialization(String),
}

/// Одна условная запись: применяется, только если текущая версия равна `expected`.
/// `expected = None` – записи ещё не должно существовать.
#[derive(Clone, Debug)]
struct PendingWrite<T> {
    id: u64,
    expected: Option<u64>,
    value: T,
}

/// Набор записей, применяемый атомарно: либо все, либо ни одной.
#[derive(Clone, Debug, Default)]
pub struct WriteSet {
    tables: Vec<PendingWrite<Table>>,
    hands: Vec<PendingWrite<Hand>>,
    agents: Vec<PendingWrite<Agent>>,
    actions: Vec<ActionLogEntry>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_table(&mut self, expected: Option<u64>, table: Table) -> &mut Self {
        self.tables.push(PendingWrite {
            id: table.id,
            expected,
            value: table,
        });
        self
    }

    pub fn put_hand(&mut self, expected: Option<u64>, hand: Hand) -> &mut Self {
        self.hands.push(PendingWrite {
            id: hand.id,
            expected,
            value: hand,
        });
        self
    }

    pub fn put_agent(&mut self, expected: Option<u64>, agent: Agent) -> &mut Self {
        self.agents.push(PendingWrite {
            id: agent.id,
            expected,
            value: agent,
        });
        self
    }

    pub fn append_actions<I: IntoIterator<Item = ActionLogEntry>>(&mut self, entries: I) -> &mut Self {
        self.actions.extend(entries);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.hands.is_empty() && self.agents.is_empty() && self.actions.is_empty()
    }
}

/// Максимальные занятые идентификаторы (для продолжения счётчиков).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaxIds {
    pub table: TableId,
    pub hand: HandId,
    pub agent: AgentId,
}

/// Абстракция хранилища.
///
/// Все изменения идут через `commit`: сравнение версий и запись
/// выполняются атомарно, поэтому из двух гонящихся операций над одной
/// записью проходит ровно одна, вторая получает `VersionConflict`.
pub trait PokerStorage: Send + Sync {
    fn load_table(&self, id: TableId) -> Option<Versioned<Table>>;

    fn load_hand(&self, id: HandId) -> Option<Versioned<Hand>>;

    fn load_agent(&self, id: AgentId) -> Option<Versioned<Agent>>;

    fn find_agent_by_name(&self, name: &str) -> Option<Versioned<Agent>>;

    fn list_tables(&self) -> Vec<Versioned<Table>>;

    fn list_agents(&self) -> Vec<Versioned<Agent>>;

    /// Незавершённые раздачи.
    fn open_hands(&self) -> Vec<Versioned<Hand>>;

    /// Последние `limit` раздач стола, новые первыми.
    fn recent_hands(&self, table_id: TableId, limit: usize) -> Vec<Hand>;

    fn actions_for_hand(&self, hand_id: HandId) -> Vec<ActionLogEntry>;

    fn max_ids(&self) -> MaxIds;

    fn commit(&self, writes: WriteSet) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreInner {
    tables: BTreeMap<TableId, Versioned<Table>>,
    hands: BTreeMap<HandId, Versioned<Hand>>,
    agents: BTreeMap<AgentId, Versioned<Agent>>,
    actions: Vec<ActionLogEntry>,
    #[serde(skip)]
    agent_names: HashMap<String, AgentId>,
}

impl StoreInner {
    fn check<T>(
        entity: &'static str,
        map: &BTreeMap<u64, Versioned<T>>,
        writes: &[PendingWrite<T>],
    ) -> Result<(), StorageError> {
        for w in writes {
            let found = map.get(&w.id).map(|v| v.version);
            if found != w.expected {
                return Err(StorageError::VersionConflict {
                    entity,
                    id: w.id,
                    expected: w.expected,
                    found,
                });
            }
        }
        Ok(())
    }

    fn apply<T>(map: &mut BTreeMap<u64, Versioned<T>>, writes: Vec<PendingWrite<T>>) {
        for w in writes {
            let version = w.expected.map_or(1, |v| v + 1);
            map.insert(
                w.id,
                Versioned {
                    version,
                    value: w.value,
                },
            );
        }
    }

    fn rebuild_name_index(&mut self) {
        self.agent_names = self
            .agents
            .values()
            .map(|a| (a.value.name.clone(), a.value.id))
            .collect();
    }
}

/// In-memory реализация для тестов и локального запуска.
///
/// Снимок всего состояния можно выгрузить в JSON и загрузить обратно.
#[derive(Debug, Default)]
pub struct InMemoryPokerStorage {
    inner: RwLock<StoreInner>,
}

impl InMemoryPokerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Выгрузить снимок в JSON.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(&*self.read()).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Загрузить снимок из JSON.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let mut inner: StoreInner =
            serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
        inner.rebuild_name_index();
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Число записей в журнале действий.
    pub fn action_count(&self) -> usize {
        self.read().actions.len()
    }
}

impl PokerStorage for InMemoryPokerStorage {
    fn load_table(&self, id: TableId) -> Option<Versioned<Table>> {
        self.read().tables.get(&id).cloned()
    }

    fn load_hand(&self, id: HandId) -> Option<Versioned<Hand>> {
        self.read().hands.get(&id).cloned()
    }

    fn load_agent(&self, id: AgentId) -> Option<Versioned<Agent>> {
        self.read().agents.get(&id).cloned()
    }

    fn find_agent_by_name(&self, name: &str) -> Option<Versioned<Agent>> {
        let inner = self.read();
        inner
            .agent_names
            .get(name)
            .and_then(|id| inner.agents.get(id))
            .cloned()
    }

    fn list_tables(&self) -> Vec<Versioned<Table>> {
        self.read().tables.values().cloned().collect()
    }

    fn list_agents(&self) -> Vec<Versioned<Agent>> {
        self.read().agents.values().cloned().collect()
    }

    fn open_hands(&self) -> Vec<Versioned<Hand>> {
        self.read()
            .hands
            .values()
            .filter(|h| !h.value.is_complete())
            .cloned()
            .collect()
    }

    fn recent_hands(&self, table_id: TableId, limit: usize) -> Vec<Hand> {
        let inner = self.read();
        let mut hands: Vec<Hand> = inner
            .hands
            .values()
            .filter(|h| h.value.table_id == table_id)
            .map(|h| h.value.clone())
            .collect();
        hands.sort_by(|a, b| b.hand_number.cmp(&a.hand_number));
        hands.truncate(limit);
        hands
    }

    fn actions_for_hand(&self, hand_id: HandId) -> Vec<ActionLogEntry> {
        self.read()
            .actions
            .iter()
            .filter(|a| a.hand_id == hand_id)
            .cloned()
            .collect()
    }

    fn max_ids(&self) -> MaxIds {
        let inner = self.read();
        MaxIds {
            table: inner.tables.keys().next_back().copied().unwrap_or(0),
            hand: inner.hands.keys().next_back().copied().unwrap_or(0),
            agent: inner.agents.keys().next_back().copied().unwrap_or(0),
        }
    }

    fn commit(&self, writes: WriteSet) -> Result<(), StorageError> {
        let mut inner = self.write();

        StoreInner::check("table", &inner.tables, &writes.tables)?;
        StoreInner::check("hand", &inner.hands, &writes.hands)?;
        StoreInner::check("agent", &inner.agents, &writes.agents)?;
        for w in &writes.agents {
            if let Some(owner) = inner.agent_names.get(&w.value.name) {
                if *owner != w.id {
                    return Err(StorageError::DuplicateAgentName(w.value.name.clone()));
                }
            }
        }

        for w in &writes.agents {
            inner.agent_names.insert(w.value.name.clone(), w.id);
        }
        StoreInner::apply(&mut inner.tables, writes.tables);
        StoreInner::apply(&mut inner.hands, writes.hands);
        StoreInner::apply(&mut inner.agents, writes.agents);
        inner.actions.extend(writes.actions);
        Ok(())
    }
}
