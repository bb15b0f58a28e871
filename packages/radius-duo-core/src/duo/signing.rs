//! Duo Auth API request signing.
//!
//! Each request carries a `Date` header and an HTTP Basic `Authorization`
//! header whose password is the HMAC of the canonical request:
//!
//! ```text
//! <date>\n<METHOD>\n<host>\n<path>\n<sorted, percent-encoded params>
//! ```

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Headers and body for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub date: String,
    pub authorization: String,
    /// Form-encoded body, identical to the canonical parameter string
    pub body: String,
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sort parameters by key and join them as `key=value` pairs.
pub fn canonical_params(params: &[(&str, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode_component(k), encode_component(v)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn canonical_request(
    date: &str,
    method: &str,
    host: &str,
    path: &str,
    params: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        date,
        method.to_uppercase(),
        host.to_lowercase(),
        path,
        params
    )
}

/// Sign a request for the given integration/secret key pair.
pub fn sign_request(
    integration_key: &str,
    secret_key: &str,
    method: &str,
    host: &str,
    path: &str,
    params: &[(&str, String)],
    date: &str,
) -> SignedRequest {
    let body = canonical_params(params);
    let canon = canonical_request(date, method, host, path, &body);

    let mut mac = <HmacSha512 as Mac>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(canon.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let credentials = BASE64.encode(format!("{}:{}", integration_key, signature));

    SignedRequest {
        date: date.to_string(),
        authorization: format!("Basic {}", credentials),
        body,
    }
}

/// Current time in the RFC 2822 form expected in the `Date` header.
pub fn request_date() -> String {
    chrono::Utc::now().to_rfc2822()
}
