//! Тесты восстановления столов после сбоев.
//!
//! Состояние портится прямой записью в хранилище, затем вызывается
//! `reconcile_table`. Здесь мы проверяем:
//! - ссылку на несуществующую раздачу;
//! - статус, не совпадающий с числом готовых игроков;
//! - зависшую раздачу без ходящего (принудительный доезд борда);
//! - пропавшего участника раздачи (заморозка);
//! - завершённую раздачу, которую стол не успел отпустить.

use std::sync::Arc;

use agent_holdem::domain::chips::Chips;
use agent_holdem::domain::deck::Deck;
use agent_holdem::domain::hand::{Hand, Turn};
use agent_holdem::domain::table::{Table, TableConfig, TableStatus};
use agent_holdem::domain::{AgentId, TableId};
use agent_holdem::engine::{EngineError, PlayerAction, RecoveryOutcome};
use agent_holdem::infra::{InMemoryPokerStorage, PokerStorage, WriteSet};
use agent_holdem::{EngineConfig, TableManager};

type Manager = TableManager<InMemoryPokerStorage>;

const NOW: u64 = 1_000;

fn manager() -> Manager {
    let config = EngineConfig {
        starting_balance: Chips(1_000),
        ..EngineConfig::default()
    };
    TableManager::new(Arc::new(InMemoryPokerStorage::new()), config)
}

fn seated(m: &Manager, n: usize) -> (TableId, Vec<AgentId>) {
    let table = m
        .create_table("recovery", TableConfig::new(6, 1, 2, 20, 100), NOW)
        .unwrap();
    let agents = (0..n)
        .map(|i| {
            let agent = m.register_agent(&format!("agent_{i}"), None, NOW).unwrap();
            m.join_table(table.id, agent.id, Chips(100), None).unwrap();
            agent.id
        })
        .collect();
    (table.id, agents)
}

/// Переписать стол в обход движка.
fn corrupt_table(m: &Manager, table_id: TableId, f: impl FnOnce(&mut Table)) {
    let current = m.store().load_table(table_id).unwrap();
    let mut table = current.value;
    f(&mut table);
    let mut ws = WriteSet::new();
    ws.put_table(Some(current.version), table);
    m.store().commit(ws).unwrap();
}

fn corrupt_hand(m: &Manager, hand_id: u64, f: impl FnOnce(&mut Hand)) {
    let current = m.store().load_hand(hand_id).unwrap();
    let mut hand = current.value;
    f(&mut hand);
    let mut ws = WriteSet::new();
    ws.put_hand(Some(current.version), hand);
    m.store().commit(ws).unwrap();
}

fn total_chips(m: &Manager) -> Chips {
    let balances: Chips = m.agents().iter().map(|a| a.balance).sum();
    let stacks: Chips = m.tables().iter().map(|t| t.total_stacks()).sum();
    balances + stacks
}

//
// ====================== БЕЗ РАЗДАЧИ ======================
//

#[test]
fn consistent_table_is_healthy() {
    let m = manager();
    let (table_id, _) = seated(&m, 2);
    assert_eq!(m.reconcile_table(table_id, NOW), Ok(RecoveryOutcome::Healthy));
}

#[test]
fn missing_hand_reference_is_cleared() {
    let m = manager();
    let (table_id, _) = seated(&m, 2);
    corrupt_table(&m, table_id, |t| {
        t.current_hand_id = Some(999);
        t.status = TableStatus::Playing;
    });

    assert_eq!(m.reconcile_table(table_id, NOW), Ok(RecoveryOutcome::ClearedMissingHand));
    let table = m.table(table_id).unwrap();
    assert_eq!(table.current_hand_id, None);
    assert_eq!(table.status, TableStatus::BetweenHands);
}

#[test]
fn wrong_resting_status_is_repaired() {
    let m = manager();
    let (table_id, _) = seated(&m, 2);
    corrupt_table(&m, table_id, |t| t.status = TableStatus::Waiting);

    assert_eq!(m.reconcile_table(table_id, NOW), Ok(RecoveryOutcome::StatusRepaired));
    assert_eq!(m.table(table_id).unwrap().status, TableStatus::BetweenHands);
}

//
// ====================== ИДУЩАЯ РАЗДАЧА ======================
//

#[test]
fn running_hand_with_wrong_status_is_repaired() {
    let m = manager();
    let (table_id, _) = seated(&m, 2);
    m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();
    corrupt_table(&m, table_id, |t| t.status = TableStatus::BetweenHands);

    assert_eq!(m.reconcile_table(table_id, NOW), Ok(RecoveryOutcome::StatusRepaired));
    assert_eq!(m.table(table_id).unwrap().status, TableStatus::Playing);
    assert_eq!(m.reconcile_table(table_id, NOW), Ok(RecoveryOutcome::Healthy));
}

#[test]
fn stuck_hand_is_run_out() {
    let m = manager();
    let (table_id, _) = seated(&m, 3);
    let before = total_chips(&m);
    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();
    corrupt_hand(&m, hand.id, |h| {
        h.turn = Turn::None;
        h.action_deadline = None;
    });

    assert_eq!(m.reconcile_table(table_id, NOW + 5), Ok(RecoveryOutcome::ForcedRunout));

    let hand = m.hand(hand.id).unwrap();
    assert!(hand.is_complete());
    assert!(hand.reached_showdown);
    assert_eq!(hand.board.len(), 5);
    let table = m.table(table_id).unwrap();
    assert_eq!(table.current_hand_id, None);
    assert_eq!(total_chips(&m), before);
    // Статистика пишется и при принудительном завершении.
    assert!(m.agents().iter().all(|a| a.stats.hands_played == 1));
}

#[test]
fn vanished_participant_freezes_table() {
    let m = manager();
    let (table_id, agents) = seated(&m, 3);
    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();
    corrupt_table(&m, table_id, |t| t.seats[2] = None);

    let outcome = m.reconcile_table(table_id, NOW).unwrap();
    assert!(matches!(outcome, RecoveryOutcome::Frozen(_)));
    assert_eq!(m.reconcile_table(table_id, NOW), Ok(RecoveryOutcome::AlreadyFrozen));

    assert!(matches!(
        m.apply_action(hand.id, PlayerAction::fold(agents[0]), NOW + 1),
        Err(EngineError::TableFrozen { .. })
    ));
    assert!(matches!(
        m.leave_table(table_id, agents[1]),
        Err(EngineError::TableFrozen { .. })
    ));
    assert!(m.table(table_id).unwrap().is_frozen());
}

#[test]
fn frozen_table_refuses_new_hands_until_unfrozen() {
    let m = manager();
    let (table_id, _) = seated(&m, 2);
    m.freeze_table(table_id, "ручная проверка").unwrap();

    assert_eq!(
        m.start_hand(table_id, NOW),
        Err(EngineError::TableFrozen {
            table_id,
            reason: "ручная проверка".into()
        })
    );

    m.unfreeze_table(table_id).unwrap();
    assert!(m.start_hand(table_id, NOW).is_ok());
}

//
// ====================== ЗАВЕРШЁННАЯ РАЗДАЧА ======================
//

#[test]
fn table_left_pointing_at_finished_hand_is_resettled() {
    let m = manager();
    let (table_id, agents) = seated(&m, 2);
    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();
    let mid_hand = m.table(table_id).unwrap();
    m.apply_action(hand.id, PlayerAction::fold(agents[0]), NOW + 1).unwrap();
    let settled = m.table(table_id).unwrap();

    // Запись стола "потерялась": он снова ссылается на раздачу со старыми стеками.
    corrupt_table(&m, table_id, |t| *t = mid_hand.clone());

    assert_eq!(
        m.reconcile_table(table_id, NOW + 2),
        Ok(RecoveryOutcome::ResettledCompleteHand)
    );
    let table = m.table(table_id).unwrap();
    assert_eq!(table.current_hand_id, None);
    assert_eq!(table.seats, settled.seats);
    assert_eq!(table.last_hand_completed_at, Some(NOW + 1));
}

#[test]
fn finished_hand_with_foreign_stacks_freezes_table() {
    let m = manager();
    let (table_id, agents) = seated(&m, 2);
    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();
    let mut broken = m.table(table_id).unwrap();
    m.apply_action(hand.id, PlayerAction::fold(agents[0]), NOW + 1).unwrap();

    broken.seats[0].as_mut().unwrap().stack = Chips(5);
    corrupt_table(&m, table_id, |t| *t = broken.clone());

    let outcome = m.reconcile_table(table_id, NOW + 2).unwrap();
    assert!(matches!(outcome, RecoveryOutcome::Frozen(_)));
}
