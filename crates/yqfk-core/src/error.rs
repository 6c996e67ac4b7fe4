//! Error taxonomy for a single report run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum YqfkError {
    // Token phase
    #[error("SSO request failed: {0}")]
    PageFetch(String),

    #[error("anti-forgery token not found on SSO page")]
    TokenNotFound,

    #[error("SSO login failed")]
    LoginFailed,

    #[error("access_token not found")]
    AccessTokenNotFound,

    // Submission phase
    #[error("failed to request report info: {0}")]
    FetchInfo(String),

    #[error("report info missing or empty")]
    ParseInfo,

    #[error("failed to send report: {0}")]
    SubmitRequest(String),

    #[error("report rejected by server: {0}")]
    SubmitRejected(String),

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, YqfkError>;

impl YqfkError {
    /// Whether the error came out of the SSO token exchange.
    pub fn is_token_phase(&self) -> bool {
        matches!(
            self,
            Self::PageFetch(_) | Self::TokenNotFound | Self::LoginFailed | Self::AccessTokenNotFound
        )
    }
}
