use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Street;
use crate::domain::{AgentId, HandId, TableId, Timestamp};
use crate::engine::actions::{ActionKind, ActionSource};

/// Запись журнала действий. Только дописывается, движок её обратно не читает.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionLogEntry {
    pub hand_id: HandId,
    pub table_id: TableId,
    pub agent_id: AgentId,
    pub street: Street,
    pub kind: ActionKind,
    pub amount: Option<Chips>,
    pub source: ActionSource,
    pub at: Timestamp,
}

/// Буфер записей, накопленных за одну операцию.
/// Менеджер столов фиксирует его в хранилище вместе с раздачей.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ActionLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ActionLogEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
