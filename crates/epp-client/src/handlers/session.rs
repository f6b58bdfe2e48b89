//! Commands that run inside a login/logout bracket.

use tracing::{error, warn};

use super::Report;
use crate::client::EppClient;
use crate::error::ClientResult;
use crate::transport::BoxFuture;

/// Logs in, runs `op`, and logs out.
///
/// A refused login is reported as-is and `op` is skipped. Logout runs even
/// when `op` fails; a logout failure is only logged.
pub async fn run_in_session<F>(client: &mut EppClient, op: F) -> ClientResult<Report>
where
    F: for<'c> FnOnce(&'c mut EppClient) -> BoxFuture<'c, ClientResult<Report>>,
{
    let login = client.login(None, None).await?;
    if let Some(ref result) = login {
        if result.disposition.is_failure() {
            error!(code = result.code(), msg = %result.status.msg, "login refused");
            return Report::command(&login);
        }
    }

    let outcome = op(&mut *client).await;

    if let Err(e) = client.logout().await {
        warn!(error = %e, "logout failed");
    }
    outcome
}

/// Logs in (optionally setting a new password) and out again.
pub async fn login(client: &mut EppClient, new_password: Option<&str>) -> ClientResult<Report> {
    let login = client.login(new_password, None).await?;
    let report = Report::command(&login)?;
    if report.success {
        if let Err(e) = client.logout().await {
            warn!(error = %e, "logout failed");
        }
    }
    Ok(report)
}
