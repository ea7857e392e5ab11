//! Тесты контроля времени: sweeper, автостарт и фоновые задачи.
//!
//! Здесь мы проверяем:
//! - принудительный ход ровно после дедлайна и повторный проход без эффекта;
//! - sit-out после серии таймаутов и снятие агента со стола;
//! - паузу между раздачами перед автостартом;
//! - связку tokio-задач с ручными часами.

use std::sync::Arc;
use std::time::Duration;

use agent_holdem::domain::chips::Chips;
use agent_holdem::domain::deck::Deck;
use agent_holdem::domain::table::TableConfig;
use agent_holdem::domain::{AgentId, TableId};
use agent_holdem::engine::{ActionSource, PlayerAction};
use agent_holdem::infra::InMemoryPokerStorage;
use agent_holdem::time_ctrl::{
    autostart_pass, ready_for_autostart, spawn_background_tasks, sweep_pass, AutostartReport,
    Clock, ManualClock, SweepReport, TimeRules,
};
use agent_holdem::{EngineConfig, TableManager};

type Manager = TableManager<InMemoryPokerStorage>;

const NOW: u64 = 1_000;
const DEADLINE: u64 = NOW + 30_000;

fn manager_with(config: EngineConfig) -> Manager {
    TableManager::new(Arc::new(InMemoryPokerStorage::new()), config)
}

fn manager() -> Manager {
    manager_with(EngineConfig {
        starting_balance: Chips(1_000),
        ..EngineConfig::default()
    })
}

fn seated(m: &Manager, n: usize) -> (TableId, Vec<AgentId>) {
    let table = m
        .create_table("clock", TableConfig::new(6, 1, 2, 20, 100), NOW)
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

//
// ====================== SWEEPER ======================
//

#[test]
fn sweeper_waits_for_deadline_then_forces_once() {
    let m = manager();
    let (table_id, _) = seated(&m, 3);
    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();

    assert!(sweep_pass(&m, DEADLINE).is_quiet());

    let report = sweep_pass(&m, DEADLINE + 1);
    assert_eq!(report.forced, 1);
    assert_eq!(report.errors, 0);

    // Следующий игрок получил свежий дедлайн, повторный проход ничего не делает.
    assert!(sweep_pass(&m, DEADLINE + 1).is_quiet());
    let log = m.hand_actions(hand.id);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].source, ActionSource::Timeout);
}

#[test]
fn repeated_timeouts_remove_agent_from_table() {
    let m = manager_with(EngineConfig {
        starting_balance: Chips(1_000),
        time: TimeRules::new(30_000, 2_000, 5_000, 1),
        ..EngineConfig::default()
    });
    let (table_id, agents) = seated(&m, 2);
    m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();

    let report = sweep_pass(&m, DEADLINE + 1);
    assert_eq!(
        report,
        SweepReport {
            forced: 1,
            removed: 1,
            ..SweepReport::default()
        }
    );

    let table = m.table(table_id).unwrap();
    assert_eq!(table.seat_of(agents[0]), None);
    // 900 на балансе + 99 со стола после сброшенного малого блайнда.
    assert_eq!(m.agent(agents[0]).unwrap().balance, Chips(999));
}

#[test]
fn player_action_resets_strike_counter() {
    let m = manager();
    let (table_id, agents) = seated(&m, 2);
    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();

    // Кнопка коллирует сама, большой блайнд проспал ход.
    m.apply_action(hand.id, PlayerAction::call(agents[0]), NOW + 1).unwrap();
    let report = sweep_pass(&m, NOW + 1 + 30_001);
    assert_eq!(report.forced, 1);

    let table = m.table(table_id).unwrap();
    assert_eq!(table.occupant(0).unwrap().consecutive_timeouts, 0);
    assert_eq!(table.occupant(1).unwrap().consecutive_timeouts, 1);
}

//
// ====================== АВТОСТАРТ ======================
//

#[test]
fn autostart_respects_delay_after_last_hand() {
    let m = manager();
    let (table_id, agents) = seated(&m, 2);
    let rules = m.config().time.clone();

    // Первая раздача стартует без паузы.
    assert!(ready_for_autostart(&m.table(table_id).unwrap(), NOW, &rules));

    let hand = m.start_hand_with_deck(table_id, Deck::standard_52(), NOW).unwrap();
    assert!(!ready_for_autostart(&m.table(table_id).unwrap(), NOW, &rules));
    m.apply_action(hand.id, PlayerAction::fold(agents[0]), NOW + 10).unwrap();

    let table = m.table(table_id).unwrap();
    assert!(!ready_for_autostart(&table, NOW + 10 + 4_999, &rules));
    assert!(ready_for_autostart(&table, NOW + 10 + 5_000, &rules));
}

#[test]
fn autostart_pass_skips_frozen_and_short_tables() {
    let m = manager();
    let (ready, _) = seated(&m, 2);
    let frozen = m.create_table("frozen", TableConfig::new(6, 1, 2, 20, 100), NOW).unwrap().id;
    for i in 0..2 {
        let agent = m.register_agent(&format!("cold_{i}"), None, NOW).unwrap();
        m.join_table(frozen, agent.id, Chips(100), None).unwrap();
    }
    m.freeze_table(frozen, "проверка").unwrap();
    let lonely = m.create_table("lonely", TableConfig::new(6, 1, 2, 20, 100), NOW).unwrap();

    let report = autostart_pass(&m, NOW);
    assert_eq!(
        report,
        AutostartReport {
            started: 1,
            raced: 0,
            failed: 0
        }
    );
    assert!(m.table(ready).unwrap().current_hand_id.is_some());
    assert!(m.table(frozen).unwrap().current_hand_id.is_none());
    assert!(m.table(lonely.id).unwrap().current_hand_id.is_none());

    // Повторный проход: стол уже играет.
    assert_eq!(autostart_pass(&m, NOW + 1), AutostartReport::default());
}

//
// ====================== ФОНОВЫЕ ЗАДАЧИ ======================
//

#[tokio::test(start_paused = true)]
async fn background_tasks_start_and_time_out_hands() {
    let config = EngineConfig {
        starting_balance: Chips(1_000),
        sweep_interval_ms: 100,
        autostart_interval_ms: 100,
        ..EngineConfig::default()
    };
    let m = Arc::new(manager_with(config.clone()));
    let (table_id, _) = seated(&m, 2);
    let clock = Arc::new(ManualClock::new(NOW));

    let tasks = spawn_background_tasks(m.clone(), clock.clone() as Arc<dyn Clock>, &config);

    tokio::time::sleep(Duration::from_millis(250)).await;
    let hand = m
        .current_hand(table_id)
        .unwrap()
        .expect("автостарт должен начать раздачу");

    clock.set(DEADLINE + 1);
    tokio::time::sleep(Duration::from_millis(250)).await;

    let finished = m.hand(hand.id).unwrap();
    assert!(finished.is_complete());
    assert_eq!(m.hand_actions(hand.id)[0].source, ActionSource::Timeout);
    // Пауза между раздачами ещё не прошла.
    assert_eq!(m.table(table_id).unwrap().current_hand_id, None);

    tasks.shutdown().await;
}
