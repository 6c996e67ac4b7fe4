//! # yqfk portal
//!
//! Client for the DGUT epidemic-report portal.
//!
//! ## Flow
//! ```text
//! PortalSession (cookie jar, one per run)
//!   ├── resolve_token: SSO page → login form → redirect → access_token
//!   └── submit_report: getBaseInfo → (already submitted? stop) → addBaseInfo
//! ```
//!
//! Every scrape of the semi-structured responses lives in [`extract`] as a
//! pure function so it can be tested without a server.

pub mod auth;
pub mod extract;
pub mod report;
pub mod session;
pub mod workflow;

pub use session::{Endpoints, PortalSession};
pub use workflow::run_report;
