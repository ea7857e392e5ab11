// src/time_ctrl/scheduler.rs
//! Две независимые периодические задачи tokio: sweeper и автостарт.
//! Каждый тик делает один проход и ничего не хранит до следующего.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::table_manager::TableManager;
use crate::infra::persistence::PokerStorage;
use crate::time_ctrl::autostart::autostart_pass;
use crate::time_ctrl::clock::Clock;
use crate::time_ctrl::sweeper::sweep_pass;

/// Остановка фоновых задач.
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl ShutdownHandle {
    /// Подать сигнал и дождаться завершения обеих задач.
    pub async fn shutdown(self) {
        let _ = self.tx.send(true);
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "фоновая задача завершилась с ошибкой");
            }
        }
    }
}

pub fn spawn_background_tasks<S>(
    manager: Arc<TableManager<S>>,
    clock: Arc<dyn Clock>,
    config: &EngineConfig,
) -> ShutdownHandle
where
    S: PokerStorage + 'static,
{
    let (tx, rx) = watch::channel(false);

    let sweep = {
        let manager = manager.clone();
        let clock = clock.clone();
        spawn_periodic("sweeper", config.sweep_interval_ms, rx.clone(), move || {
            let report = sweep_pass(&manager, clock.now_ms());
            if !report.is_quiet() {
                info!(?report, "проход sweeper-а");
            }
        })
    };

    let autostart = spawn_periodic("autostart", config.autostart_interval_ms, rx, move || {
        let report = autostart_pass(&manager, clock.now_ms());
        if report.started > 0 || report.failed > 0 {
            info!(?report, "проход автостарта");
        }
    });

    ShutdownHandle {
        tx,
        handles: vec![sweep, autostart],
    }
}

fn spawn_periodic<F>(
    name: &'static str,
    period_ms: u64,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(period_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => tick(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!(task = name, "фоновая задача остановлена");
    })
}
