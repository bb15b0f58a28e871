//! The preauth/push state machine.
//!
//! `Init -> Preauth -> {Ok, Reject, Fail, Challenge} -> {Ok, Reject, Fail}`.
//! Every transition happens at most once and nothing is retried.

use super::outcome::{AuthOutcome, ExitStatus, PreauthOutcome, Verdict};
use super::request::AuthRequest;
use std::future::Future;

/// A remote second-factor service.
///
/// Implementations own their transport and must resolve every call to an
/// outcome; transport failures and timeouts become `Error`.
pub trait SecondFactor {
    /// Check whether the user needs a challenge at all.
    fn preauth(&self, username: &str) -> impl Future<Output = PreauthOutcome> + Send;

    /// Send a push challenge and wait for its terminal result.
    fn push_challenge(
        &self,
        username: &str,
        message: Option<&str>,
    ) -> impl Future<Output = AuthOutcome> + Send;
}

/// Run the full second-factor flow for one request.
pub async fn authenticate<S: SecondFactor>(service: &S, request: &AuthRequest) -> Verdict {
    let username = request.username();

    match service.preauth(username).await {
        PreauthOutcome::Allow(status_msg) => {
            tracing::info!("Preauth allowed {} without a challenge", username);
            return Verdict::new(ExitStatus::Ok, status_msg);
        }
        PreauthOutcome::Reject(status_msg) => {
            tracing::info!("Preauth rejected {}: {}", username, status_msg);
            return Verdict::new(ExitStatus::Reject, status_msg);
        }
        PreauthOutcome::Error(message) => {
            tracing::warn!("Preauth failed for {}: {}", username, message);
            return Verdict::fail("Duo preauth failed", &message);
        }
        PreauthOutcome::ChallengeRequired => {
            tracing::debug!(
                "Challenge required for {}, sending push to device '{}'",
                username,
                request.device()
            );
        }
    }

    match service
        .push_challenge(username, request.push_message())
        .await
    {
        AuthOutcome::Allow => {
            tracing::info!("Push approved for {}", username);
            Verdict::new(
                ExitStatus::Ok,
                format!("Duo authentication succeeded for {}", username),
            )
        }
        AuthOutcome::Reject => {
            tracing::info!("Push not approved for {}", username);
            Verdict::new(
                ExitStatus::Reject,
                format!("Duo authentication failed for {}", username),
            )
        }
        AuthOutcome::Error(message) => {
            tracing::warn!("Push failed for {}: {}", username, message);
            Verdict::fail("Duo auth failed", &message)
        }
    }
}
