//! Radius Duo Core Library
//!
//! This crate provides the core functionality for the FreeRADIUS Duo exec module:
//! - Configuration loading (Duo integration key, secret key and API host)
//! - The two-phase second-factor flow (preauth, then push when required)
//! - Mapping of every outcome onto the FreeRADIUS exec exit codes
//! - A signed Duo Auth API v2 client
//!
//! # Example
//!
//! ```no_run
//! use radius_duo_core::{auth, config, duo};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let creds = config::load_credentials("/etc/raddb/duo.json")?;
//!     let request = auth::AuthRequest::new("alice", None, auth::HttpsTimeout::default())?;
//!
//!     let client = duo::DuoClient::new(&creds, request.timeout())?;
//!     let verdict = auth::authenticate(&client, &request).await;
//!
//!     if let Some(line) = &verdict.message {
//!         println!("{}", line);
//!     }
//!     std::process::exit(verdict.status.code());
//! }
//! ```

pub mod auth;
pub mod config;
pub mod duo;

// Re-export commonly used types
pub use auth::{
    ArgumentError, AuthOutcome, AuthRequest, ExitStatus, HttpsTimeout, PreauthOutcome,
    SecondFactor, Verdict, authenticate,
};
pub use config::{ConfigError, RemoteCredentials, load_credentials};
pub use duo::{DuoClient, DuoError, ServiceInitError};
