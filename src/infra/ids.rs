use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{AgentId, HandId, TableId};

/// Генерация ID на основе монотонных счётчиков.
///
/// При старте поверх уже заполненного хранилища счётчики продолжают
/// с максимальных существующих значений (`starting_after`).
#[derive(Debug)]
pub struct IdGenerator {
    table_counter: AtomicU64,
    agent_counter: AtomicU64,
    hand_counter: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Создать генератор с начальным значением 1 для всех сущностей.
    pub fn new() -> Self {
        Self::starting_after(0, 0, 0)
    }

    pub fn starting_after(max_table: TableId, max_hand: HandId, max_agent: AgentId) -> Self {
        Self {
            table_counter: AtomicU64::new(max_table + 1),
            agent_counter: AtomicU64::new(max_agent + 1),
            hand_counter: AtomicU64::new(max_hand + 1),
        }
    }

    #[inline]
    pub fn next_table_id(&self) -> TableId {
        self.table_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_agent_id(&self) -> AgentId {
        self.agent_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_hand_id(&self) -> HandId {
        self.hand_counter.fetch_add(1, Ordering::Relaxed)
    }
}
