//! # yqfk core
//!
//! Shared configuration, error taxonomy and data model used by the portal
//! client, the scheduler and the `yqfk` binary.

pub mod config;
pub mod error;
pub mod types;

pub use config::YqfkConfig;
pub use error::{Result, YqfkError};
pub use types::{AccessToken, Credentials, RunOutcome, SubmitStatus};

#[doc(hidden)]
pub use tracing;

/// Log a success line. Same as `tracing::info!` plus the `success = true`
/// field the console formatter renders as `[SUCCESS]`.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(success = true, $($arg)+)
    };
}
