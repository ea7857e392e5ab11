use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Chips;
use crate::infra::rng_seed::RngSeed;
use crate::time_ctrl::TimeRules;

/// Настройки движка и фоновых задач.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    pub time: TimeRules,
    /// Период прохода sweeper-а.
    pub sweep_interval_ms: u64,
    /// Период прохода автостарта.
    pub autostart_interval_ms: u64,
    /// Баланс нового агента.
    pub starting_balance: Chips,
    /// Базовый seed тасовки. None – системный RNG.
    pub rng_seed: Option<u64>,
    /// Файл JSON-снимка хранилища для демона.
    pub snapshot_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time: TimeRules::standard(),
            sweep_interval_ms: 5_000,
            autostart_interval_ms: 10_000,
            starting_balance: Chips(100),
            rng_seed: None,
            snapshot_path: None,
        }
    }
}

impl EngineConfig {
    /// Прочитать конфиг из окружения (и `.env`, если есть).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собрать конфиг из произвольного источника переменных.
    /// Неразборчивые значения пишутся в лог и заменяются значениями по умолчанию.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let time = TimeRules::new(
            parse_or("HOLDEM_ACTION_TIMEOUT_MS", &lookup, d.time.action_timeout_ms),
            parse_or("HOLDEM_GRACE_MS", &lookup, d.time.grace_ms),
            parse_or("HOLDEM_AUTOSTART_DELAY_MS", &lookup, d.time.autostart_delay_ms),
            parse_or("HOLDEM_MAX_TIMEOUTS", &lookup, d.time.max_consecutive_timeouts),
        );

        let rng_seed = lookup("HOLDEM_RNG_SEED").and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                tracing::warn!(value = %raw, "HOLDEM_RNG_SEED не число, используется системный RNG");
                None
            }
        });

        Self {
            time,
            sweep_interval_ms: parse_or("HOLDEM_SWEEP_INTERVAL_MS", &lookup, d.sweep_interval_ms),
            autostart_interval_ms: parse_or("HOLDEM_AUTOSTART_INTERVAL_MS", &lookup, d.autostart_interval_ms),
            starting_balance: Chips(parse_or("HOLDEM_STARTING_BALANCE", &lookup, d.starting_balance.0)),
            rng_seed,
            snapshot_path: lookup("HOLDEM_SNAPSHOT_PATH").filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn seed(&self) -> Option<RngSeed> {
        self.rng_seed.map(RngSeed::from_u64)
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, %default, "некорректное значение, используется значение по умолчанию");
                default
            }
        },
    }
}
