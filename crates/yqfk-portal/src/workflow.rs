//! One complete report run: fresh session, token, submission, outcome.

use yqfk_core::error::Result;
use yqfk_core::success;
use yqfk_core::types::{Credentials, RunOutcome, SubmitStatus};

use crate::session::{Endpoints, PortalSession};

/// Run the whole report sequence once and fold the result into a
/// [`RunOutcome`]. Errors end the run; they are logged here and never
/// escape, so the caller only has to notify.
pub async fn run_report(credentials: &Credentials, endpoints: &Endpoints) -> RunOutcome {
    match try_run(credentials, endpoints).await {
        Ok(SubmitStatus::Submitted) => {
            success!("Epidemic report submitted");
            RunOutcome::success("今日疫情上报成功")
        }
        Ok(SubmitStatus::AlreadySubmitted) => {
            success!("Epidemic report already on file for today");
            RunOutcome::success("今日已提交")
        }
        Err(e) => {
            let phase = if e.is_token_phase() { "Login" } else { "Report" };
            tracing::error!("{phase} failed: {e}");
            RunOutcome::failure(e.to_string())
        }
    }
}

async fn try_run(credentials: &Credentials, endpoints: &Endpoints) -> Result<SubmitStatus> {
    if !credentials.is_complete() {
        tracing::warn!("Username or password is empty, login will most likely fail");
    }

    let session = PortalSession::new(endpoints.clone())?;
    let token = session.resolve_token(credentials).await?;
    tracing::info!("Obtained access_token");
    session.submit_report(&token).await
}
