// src/time_ctrl/mod.rs
//! Контроль времени: правила тайминга, источник времени,
//! проходы sweeper-а и автостарта и их планировщик.

pub mod autostart;
pub mod clock;
pub mod scheduler;
pub mod sweeper;
pub mod time_rules;

pub use autostart::{autostart_pass, ready_for_autostart, AutostartReport};
pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{spawn_background_tasks, ShutdownHandle};
pub use sweeper::{sweep_pass, SweepReport};
pub use time_rules::TimeRules;
