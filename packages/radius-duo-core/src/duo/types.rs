//! Duo Auth API v2 response bodies.

use serde::Deserialize;

use super::DuoError;

/// Every Duo response is wrapped in this envelope. Successful calls carry
/// `stat: "OK"` and a `response`; failures carry `stat: "FAIL"` with a code
/// and message.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub stat: String,
    pub response: Option<T>,
    pub code: Option<u32>,
    pub message: Option<String>,
    pub message_detail: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, DuoError> {
        if self.stat != "OK" {
            return Err(DuoError::Service {
                code: self.code,
                message: self.message.unwrap_or_else(|| format!("stat {}", self.stat)),
                detail: self.message_detail,
            });
        }

        self.response
            .ok_or_else(|| DuoError::InvalidResponse("missing 'response' object".to_string()))
    }
}

/// `/auth/v2/preauth` response
#[derive(Debug, Clone, Deserialize)]
pub struct PreauthResponse {
    /// `allow`, `auth`, `deny` or `enroll`
    pub result: String,
    #[serde(default)]
    pub status_msg: String,
}

/// `/auth/v2/auth` response for a synchronous push
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// `allow` or `deny`
    pub result: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let body = r#"{"stat": "OK", "response": {"result": "auth", "status_msg": "Account is active",
            "devices": [{"device": "DPFZRS9FB0D46QFTM891", "capabilities": ["push"]}]}}"#;
        let env: Envelope<PreauthResponse> = serde_json::from_str(body).unwrap();
        let resp = env.into_result().unwrap();
        assert_eq!(resp.result, "auth");
        assert_eq!(resp.status_msg, "Account is active");
    }

    #[test]
    fn test_fail_envelope() {
        let body = r#"{"stat": "FAIL", "code": 40002, "message": "Invalid request parameters",
            "message_detail": "username"}"#;
        let env: Envelope<PreauthResponse> = serde_json::from_str(body).unwrap();
        let err = env.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "40002: Invalid request parameters (username)"
        );
    }

    #[test]
    fn test_ok_envelope_without_response() {
        let env: Envelope<AuthResponse> = serde_json::from_str(r#"{"stat": "OK"}"#).unwrap();
        assert!(matches!(
            env.into_result(),
            Err(DuoError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_auth_response_optional_fields() {
        let resp: AuthResponse = serde_json::from_str(r#"{"result": "deny"}"#).unwrap();
        assert_eq!(resp.result, "deny");
        assert!(resp.status.is_none());
        assert!(resp.status_msg.is_empty());
    }
}
