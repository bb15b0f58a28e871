//! Per-invocation authentication request and its validation.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Device selection sent with every push challenge
pub const PUSH_DEVICE: &str = "auto";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Timeout must be between {min} and {max} milliseconds, got {value}")]
    TimeoutOutOfRange { value: u64, min: u64, max: u64 },

    #[error("Timeout must be a number of milliseconds, got '{0}'")]
    InvalidTimeout(String),

    #[error("User to authenticate not specified")]
    EmptyUsername,
}

/// HTTPS request timeout, bounded to `[MIN, MAX]` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpsTimeout(u64);

impl HttpsTimeout {
    pub const MIN: u64 = 100;
    pub const MAX: u64 = 30_000;
    pub const DEFAULT: u64 = 3_000;

    pub fn from_millis(millis: u64) -> Result<Self, ArgumentError> {
        if !(Self::MIN..=Self::MAX).contains(&millis) {
            return Err(ArgumentError::TimeoutOutOfRange {
                value: millis,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(millis))
    }

    /// Parse a command-line value. Usable directly as a clap `value_parser`.
    pub fn parse(value: &str) -> Result<Self, ArgumentError> {
        let millis = value
            .trim()
            .parse::<u64>()
            .map_err(|_| ArgumentError::InvalidTimeout(value.to_string()))?;
        Self::from_millis(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for HttpsTimeout {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for HttpsTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// What to authenticate, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    username: String,
    push_message: Option<String>,
    timeout: HttpsTimeout,
}

impl AuthRequest {
    pub fn new(
        username: &str,
        push_message: Option<&str>,
        timeout: HttpsTimeout,
    ) -> Result<Self, ArgumentError> {
        if username.trim().is_empty() {
            return Err(ArgumentError::EmptyUsername);
        }

        Ok(Self {
            username: username.to_string(),
            push_message: push_message.map(|s| s.to_string()),
            timeout,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Optional context shown on the device prompt
    pub fn push_message(&self) -> Option<&str> {
        self.push_message.as_deref()
    }

    pub fn timeout(&self) -> HttpsTimeout {
        self.timeout
    }

    pub fn device(&self) -> &'static str {
        PUSH_DEVICE
    }
}
