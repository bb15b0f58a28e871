//! Duo configuration file loading.
//!
//! The file is a JSON object with the credentials nested under `duo`:
//!
//! ```json
//! {"duo": {
//!    "integration_key": "DIxxx",
//!    "secret_key": "xxxxx",
//!    "api_host": "api-xxx.duosecurity.com"}}
//! ```
//!
//! Any other keys, at either level, are ignored.

use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the object holding the credentials
const DUO_SECTION: &str = "duo";

const FIELD_INTEGRATION_KEY: &str = "integration_key";
const FIELD_SECRET_KEY: &str = "secret_key";
const FIELD_API_HOST: &str = "api_host";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read, was not JSON, or was not a JSON object
    #[error("Error parsing {path}. Must be a valid JSON object.")]
    NotAnObject { path: String },

    #[error("Error parsing {path}. Did not contain an object named 'duo'.")]
    MissingSection { path: String },

    #[error("Error parsing {path}: No string named '{field}' in the 'duo' object.")]
    MissingField { path: String, field: &'static str },
}

/// Credentials for the Duo Auth API, loaded once per invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub api_host: String,
    pub integration_key: String,
    pub secret_key: String,
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("api_host", &self.api_host)
            .field("integration_key", &self.integration_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Load Duo credentials from a JSON configuration file.
pub fn load_credentials(path: impl AsRef<Path>) -> Result<RemoteCredentials, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| {
        tracing::debug!("Failed to read config file {:?}: {}", path, e);
        ConfigError::NotAnObject {
            path: display.clone(),
        }
    })?;

    let creds = parse_credentials(&content, &display)?;
    tracing::debug!("Loaded Duo config from {:?} (host: {})", path, creds.api_host);
    Ok(creds)
}

/// Parse credentials from the raw document. `path` is only used in error messages.
pub fn parse_credentials(content: &str, path: &str) -> Result<RemoteCredentials, ConfigError> {
    let root: Value = serde_json::from_str(content).map_err(|e| {
        tracing::debug!("Invalid JSON in {}: {}", path, e);
        ConfigError::NotAnObject {
            path: path.to_string(),
        }
    })?;

    let root = root.as_object().ok_or_else(|| ConfigError::NotAnObject {
        path: path.to_string(),
    })?;

    let duo = root
        .get(DUO_SECTION)
        .and_then(Value::as_object)
        .ok_or_else(|| ConfigError::MissingSection {
            path: path.to_string(),
        })?;

    // Field order matches the order errors are reported in
    let integration_key = required_string(duo, FIELD_INTEGRATION_KEY, path)?;
    let secret_key = required_string(duo, FIELD_SECRET_KEY, path)?;
    let api_host = required_string(duo, FIELD_API_HOST, path)?;

    Ok(RemoteCredentials {
        api_host,
        integration_key,
        secret_key,
    })
}

fn required_string(
    section: &Map<String, Value>,
    field: &'static str,
    path: &str,
) -> Result<String, ConfigError> {
    section
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingField {
            path: path.to_string(),
            field,
        })
}
