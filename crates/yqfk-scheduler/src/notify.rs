//! Notification built from a run outcome.

use yqfk_core::types::RunOutcome;

/// A push message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Title/summary.
    pub title: String,
    /// Body content.
    pub body: String,
}

impl Notification {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

impl From<&RunOutcome> for Notification {
    fn from(outcome: &RunOutcome) -> Self {
        Self::new(outcome.title(), &outcome.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_outcome() {
        let n = Notification::from(&RunOutcome::failure("SSO login failed"));
        assert_eq!(n.title, "疫情防控: 失败");
        assert_eq!(n.body, "SSO login failed");
    }
}
