use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use agent_holdem::infra::InMemoryPokerStorage;
use agent_holdem::time_ctrl::{spawn_background_tasks, Clock, SystemClock};
use agent_holdem::{EngineConfig, TableManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(?config, "agent_holdem_daemon: старт");

    let store = Arc::new(load_store(config.snapshot_path.as_deref())?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let manager = Arc::new(TableManager::new(store.clone(), config.clone()));

    let seeded = manager.seed_default_tables(clock.now_ms())?;
    for table in &seeded {
        tracing::info!(table_id = table.id, name = %table.name, "создан стол по умолчанию");
    }

    let tasks = spawn_background_tasks(manager.clone(), clock, &config);
    tracing::info!(
        sweep_ms = config.sweep_interval_ms,
        autostart_ms = config.autostart_interval_ms,
        "фоновые задачи запущены"
    );

    tokio::signal::ctrl_c().await.context("ожидание Ctrl-C")?;
    tracing::info!("остановка…");
    tasks.shutdown().await;

    if let Some(path) = &config.snapshot_path {
        let json = store.to_json()?;
        std::fs::write(path, json).with_context(|| format!("запись снимка в {path}"))?;
        tracing::info!(path = %path, "снимок хранилища сохранён");
    }
    Ok(())
}

fn load_store(path: Option<&str>) -> anyhow::Result<InMemoryPokerStorage> {
    match path {
        Some(p) if Path::new(p).exists() => {
            let json = std::fs::read_to_string(p).with_context(|| format!("чтение снимка {p}"))?;
            let store = InMemoryPokerStorage::from_json(&json)?;
            tracing::info!(path = %p, "хранилище восстановлено из снимка");
            Ok(store)
        }
        _ => Ok(InMemoryPokerStorage::new()),
    }
}
