//! Duo Auth API v2 integration.
//!
//! Provides a signed HTTP client that implements the second-factor flow's
//! [`SecondFactor`](crate::auth::SecondFactor) capability.

mod client;
pub mod signing;
pub mod types;

pub use client::{AUTH_PATH, DuoClient, PREAUTH_PATH, map_auth, map_preauth};

use thiserror::Error;

/// The Duo client could not be constructed. Fatal before any network call.
#[derive(Debug, Error)]
pub enum ServiceInitError {
    #[error("invalid API host '{0}'")]
    InvalidHost(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors from a single Duo API call.
#[derive(Debug, Error)]
pub enum DuoError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("{0}")]
    Transport(String),

    /// Duo answered with `stat: "FAIL"`
    #[error("{}", service_message(.code, .message, .detail))]
    Service {
        code: Option<u32>,
        message: String,
        detail: Option<String>,
    },

    /// Non-JSON body with a non-success HTTP status
    #[error("server returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

fn service_message(code: &Option<u32>, message: &str, detail: &Option<String>) -> String {
    let mut out = match code {
        Some(code) => format!("{}: {}", code, message),
        None => message.to_string(),
    };
    if let Some(detail) = detail.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!(" ({})", detail));
    }
    out
}
