//! Daily report: read today's status and post the template back if needed.

use yqfk_core::error::{Result, YqfkError};
use yqfk_core::types::{AccessToken, SubmitStatus};

use crate::extract;
use crate::session::PortalSession;

impl PortalSession {
    /// Submit today's report unless the portal says it already exists.
    ///
    /// The `info` fragment from `getBaseInfo` is posted verbatim to
    /// `addBaseInfo`; the portal accepts its own template as the report.
    pub async fn submit_report(&self, token: &AccessToken) -> Result<SubmitStatus> {
        let body = self.fetch_report_info(token).await?;
        let info = extract::extract_report_info(&body)?;

        if extract::is_submitted(info) {
            tracing::info!("Today's report already submitted, nothing to do");
            return Ok(SubmitStatus::AlreadySubmitted);
        }

        let response = self
            .client
            .post(self.endpoints.report_submit_url())
            .bearer_auth(token.as_str())
            .body(info.to_string())
            .send()
            .await
            .map_err(|e| YqfkError::SubmitRequest(e.to_string()))?;
        let text = response
            .text()
            .await
            .map_err(|e| YqfkError::SubmitRequest(e.to_string()))?;

        if extract::is_submitted(&text) {
            Ok(SubmitStatus::Submitted)
        } else {
            Err(YqfkError::SubmitRejected(text))
        }
    }

    async fn fetch_report_info(&self, token: &AccessToken) -> Result<String> {
        let response = self
            .client
            .get(self.endpoints.report_info_url())
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| YqfkError::FetchInfo(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| YqfkError::FetchInfo(e.to_string()))
    }
}
