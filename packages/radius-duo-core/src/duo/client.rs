use super::signing::{encode_component, request_date, sign_request};
use super::types::{AuthResponse, Envelope, PreauthResponse};
use super::{DuoError, ServiceInitError};
use crate::auth::{AuthOutcome, HttpsTimeout, PUSH_DEVICE, PreauthOutcome, SecondFactor};
use crate::config::RemoteCredentials;
use reqwest::Url;
use serde::de::DeserializeOwned;

pub const PREAUTH_PATH: &str = "/auth/v2/preauth";
pub const AUTH_PATH: &str = "/auth/v2/auth";

const USER_AGENT: &str = concat!("radius-duo-auth/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back to the operator
const MAX_ERROR_BODY: usize = 200;

/// Signed client for the Duo Auth API.
///
/// Holds one HTTP client for the lifetime of the invocation; every request
/// is bounded by the configured timeout.
pub struct DuoClient {
    http: reqwest::Client,
    base_url: Url,
    /// `host[:port]` as used in the signature
    host: String,
    integration_key: String,
    secret_key: String,
    timeout: HttpsTimeout,
}

impl DuoClient {
    pub fn new(creds: &RemoteCredentials, timeout: HttpsTimeout) -> Result<Self, ServiceInitError> {
        let host = creds.api_host.trim();
        if host.is_empty() || host.contains('/') {
            return Err(ServiceInitError::InvalidHost(creds.api_host.clone()));
        }

        Self::with_base_url(creds, &format!("https://{}", host), timeout)
    }

    /// Create a client for an explicit base URL instead of `https://<api_host>`.
    pub fn with_base_url(
        creds: &RemoteCredentials,
        base_url: &str,
        timeout: HttpsTimeout,
    ) -> Result<Self, ServiceInitError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ServiceInitError::InvalidHost(base_url.to_string()))?;

        let host = match (base_url.host_str(), base_url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ServiceInitError::InvalidHost(base_url.to_string())),
        };

        let http = reqwest::Client::builder()
            .timeout(timeout.as_duration())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ServiceInitError::HttpClient(e.to_string()))?;

        tracing::debug!("Duo client ready for {} (timeout {})", host, timeout);

        Ok(Self {
            http,
            base_url,
            host,
            integration_key: creds.integration_key.clone(),
            secret_key: creds.secret_key.clone(),
            timeout,
        })
    }

    pub fn api_host(&self) -> &str {
        &self.host
    }

    /// Call `/auth/v2/preauth` for a user.
    pub async fn preauth_request(&self, username: &str) -> Result<PreauthResponse, DuoError> {
        let params = [("username", username.to_string())];
        self.post(PREAUTH_PATH, &params).await
    }

    /// Call `/auth/v2/auth` with a synchronous push to the user's default device.
    ///
    /// The optional message is sent as the only `pushinfo` entry, which Duo
    /// shows on the device prompt.
    pub async fn push_request(
        &self,
        username: &str,
        message: Option<&str>,
    ) -> Result<AuthResponse, DuoError> {
        let mut params = vec![
            ("username", username.to_string()),
            ("factor", "push".to_string()),
            ("device", PUSH_DEVICE.to_string()),
        ];

        if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
            params.push(("pushinfo", format!("message={}", encode_component(message))));
        }

        self.post(AUTH_PATH, &params).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, DuoError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| DuoError::Transport(e.to_string()))?;

        let signed = sign_request(
            &self.integration_key,
            &self.secret_key,
            "POST",
            &self.host,
            url.path(),
            params,
            &request_date(),
        );

        tracing::debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header("Date", signed.date)
            .header("Authorization", signed.authorization)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(signed.body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        // Duo reports its own errors as JSON even on 4xx, so try the envelope first
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => envelope.into_result(),
            Err(e) if status.is_success() => Err(DuoError::InvalidResponse(e.to_string())),
            Err(_) => {
                tracing::debug!("Duo returned {} with a non-JSON body", status);
                Err(DuoError::Http {
                    status: status.as_u16(),
                    body: body.trim().chars().take(MAX_ERROR_BODY).collect(),
                })
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> DuoError {
        if e.is_timeout() {
            DuoError::Timeout(self.timeout.as_millis())
        } else {
            DuoError::Transport(e.to_string())
        }
    }
}

/// Map a preauth call onto its outcome. Only an exact `allow` or `auth`
/// avoids rejection.
pub fn map_preauth(result: Result<PreauthResponse, DuoError>) -> PreauthOutcome {
    match result {
        Ok(resp) => match resp.result.as_str() {
            "allow" => PreauthOutcome::Allow(resp.status_msg),
            "auth" => PreauthOutcome::ChallengeRequired,
            other => {
                tracing::debug!("Preauth result '{}' treated as rejection", other);
                PreauthOutcome::Reject(resp.status_msg)
            }
        },
        Err(e) => PreauthOutcome::Error(e.to_string()),
    }
}

/// Map a push call onto its outcome.
pub fn map_auth(result: Result<AuthResponse, DuoError>) -> AuthOutcome {
    match result {
        Ok(resp) if resp.result == "allow" => AuthOutcome::Allow,
        Ok(resp) => {
            tracing::debug!(
                "Push result '{}' (status {:?}): {}",
                resp.result,
                resp.status,
                resp.status_msg
            );
            AuthOutcome::Reject
        }
        Err(e) => AuthOutcome::Error(e.to_string()),
    }
}

impl SecondFactor for DuoClient {
    async fn preauth(&self, username: &str) -> PreauthOutcome {
        map_preauth(self.preauth_request(username).await)
    }

    async fn push_challenge(&self, username: &str, message: Option<&str>) -> AuthOutcome {
        map_auth(self.push_request(username, message).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(host: &str) -> RemoteCredentials {
        RemoteCredentials {
            api_host: host.to_string(),
            integration_key: "DIXXXXXXXXXXXXXXXXXX".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    fn preauth(result: &str, msg: &str) -> Result<PreauthResponse, DuoError> {
        Ok(PreauthResponse {
            result: result.to_string(),
            status_msg: msg.to_string(),
        })
    }

    fn auth(result: &str) -> Result<AuthResponse, DuoError> {
        Ok(AuthResponse {
            result: result.to_string(),
            status: None,
            status_msg: String::new(),
        })
    }

    #[test]
    fn test_map_preauth() {
        assert_eq!(
            map_preauth(preauth("allow", "ok")),
            PreauthOutcome::Allow("ok".to_string())
        );
        assert_eq!(
            map_preauth(preauth("auth", "Account is active")),
            PreauthOutcome::ChallengeRequired
        );
        assert_eq!(
            map_preauth(preauth("deny", "Access denied")),
            PreauthOutcome::Reject("Access denied".to_string())
        );
        assert_eq!(
            map_preauth(preauth("enroll", "Enroll first")),
            PreauthOutcome::Reject("Enroll first".to_string())
        );
    }

    #[test]
    fn test_map_preauth_is_case_sensitive() {
        assert!(matches!(
            map_preauth(preauth("Allow", "")),
            PreauthOutcome::Reject(_)
        ));
        assert!(matches!(
            map_preauth(preauth("AUTH", "")),
            PreauthOutcome::Reject(_)
        ));
    }

    #[test]
    fn test_map_preauth_error() {
        assert_eq!(
            map_preauth(Err(DuoError::Timeout(3000))),
            PreauthOutcome::Error("request timed out after 3000ms".to_string())
        );
    }

    #[test]
    fn test_map_auth() {
        assert_eq!(map_auth(auth("allow")), AuthOutcome::Allow);
        assert_eq!(map_auth(auth("deny")), AuthOutcome::Reject);
        assert_eq!(map_auth(auth("waiting")), AuthOutcome::Reject);
        assert_eq!(
            map_auth(Err(DuoError::Http {
                status: 502,
                body: "Bad Gateway".to_string()
            })),
            AuthOutcome::Error("server returned 502: Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_new_uses_lowercased_host() {
        let client = DuoClient::new(&creds("API-XXXXXXXX.duosecurity.com"), HttpsTimeout::default())
            .unwrap();
        assert_eq!(client.api_host(), "api-xxxxxxxx.duosecurity.com");
    }

    #[test]
    fn test_new_rejects_malformed_hosts() {
        for host in ["", "  ", "https://api.example.com", "api.example.com/path", "bad host"] {
            assert!(
                matches!(
                    DuoClient::new(&creds(host), HttpsTimeout::default()),
                    Err(ServiceInitError::InvalidHost(_))
                ),
                "host {:?} should be rejected",
                host
            );
        }
    }

    #[test]
    fn test_with_base_url_keeps_port() {
        let client = DuoClient::with_base_url(
            &creds("ignored"),
            "http://127.0.0.1:8443",
            HttpsTimeout::default(),
        )
        .unwrap();
        assert_eq!(client.api_host(), "127.0.0.1:8443");
    }
}
