//! Outcome types for both phases and the FreeRADIUS exit status.

use std::process::ExitCode;

/// Result of the preauth check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreauthOutcome {
    /// No second factor needed this time; carries the service status message
    Allow(String),
    /// The user must complete a push challenge
    ChallengeRequired,
    /// Denied, not enrolled, or any other result; carries the status message
    Reject(String),
    /// Transport or service failure
    Error(String),
}

/// Result of the push challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Allow,
    Reject,
    Error(String),
}

/// FreeRADIUS exec module exit codes. These values are a contract with the
/// calling server and must never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// auth ok
    Ok = 0,
    /// user rejected
    Reject = 1,
    /// module failed
    Fail = 2,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

/// Terminal result of one invocation: the exit status and the single line
/// to print on stdout, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: ExitStatus,
    pub message: Option<String>,
}

impl Verdict {
    pub fn new(status: ExitStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    /// A failure verdict. Empty messages are dropped so nothing blank is printed.
    pub fn fail(prefix: &str, message: &str) -> Self {
        let message = message.trim();
        Self {
            status: ExitStatus::Fail,
            message: (!message.is_empty()).then(|| format!("{}: {}", prefix, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_fixed() {
        assert_eq!(ExitStatus::Ok.code(), 0);
        assert_eq!(ExitStatus::Reject.code(), 1);
        assert_eq!(ExitStatus::Fail.code(), 2);
    }

    #[test]
    fn test_fail_verdict_drops_empty_message() {
        let verdict = Verdict::fail("Duo auth failed", "");
        assert_eq!(verdict.status, ExitStatus::Fail);
        assert_eq!(verdict.message, None);

        let verdict = Verdict::fail("Duo auth failed", "connection refused");
        assert_eq!(
            verdict.message.as_deref(),
            Some("Duo auth failed: connection refused")
        );
    }
}
