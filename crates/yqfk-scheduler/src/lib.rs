//! # yqfk scheduler
//!
//! Fires the report workflow and relays the result.
//!
//! ## Architecture
//! ```text
//! Startup ──┐
//!           ├── Scheduler::fire(trigger) ── job (skipped while a run is in progress)
//! Daily ────┘        (cron in local tz)
//!
//! RunOutcome → Notification → ServerChan relay (best effort)
//! ```

pub mod cron;
pub mod dispatch;
pub mod engine;
pub mod notify;

pub use cron::CronSchedule;
pub use dispatch::ServerChan;
pub use engine::{Scheduler, Trigger, run_daily};
pub use notify::Notification;
