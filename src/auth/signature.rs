//! HMAC-SHA1 request signing for Aliyun RPC-style APIs.
//!
//! Aliyun signs the query string of a GET request:
//! ```text
//! canonical  = sorted(key=value pairs), each side RFC 3986 encoded, joined by '&'
//! to_sign    = "GET" + "&" + encode("/") + "&" + encode(canonical)
//! Signature  = base64(HMAC-SHA1(to_sign, access_key_secret + "&"))
//! ```
//!
//! The signature is then appended to the query string as `Signature`.
//!
//! Two encodings are involved and they are not interchangeable. The
//! canonical string uses strict RFC 3986 encoding, which also escapes
//! `! ' ( ) *`. The final URL uses URI-component encoding, which leaves those
//! five characters alone.

use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use sha1::Sha1;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::auth::SignedCredential;
use crate::error::BalanceError;
use crate::providers::endpoints::{aliyun, aliyun_endpoint_for_region};

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters are the only ones left as-is.
const STRICT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters left as-is by URI-component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A signed request, ready to send.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Full request URL including the `Signature` parameter
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// The base64 signature, also present in `url`
    pub signature: String,
}

/// Strict RFC 3986 encoding used for the canonical query string.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, STRICT).to_string()
}

/// URI-component encoding used for the final request URL.
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Format a timestamp as ISO 8601 UTC without fractional seconds.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, BalanceError> {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]Z"
        ))
        .map_err(|e| BalanceError::Signing(format!("Invalid timestamp: {e}")))
}

/// Build the canonical query string from sorted parameters.
pub fn canonical_query(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string to sign for a GET request.
pub fn string_to_sign(canonical_query: &str) -> String {
    format!("GET&{}&{}", percent_encode("/"), percent_encode(canonical_query))
}

/// Compute the base64 HMAC-SHA1 signature of `string_to_sign`.
pub fn compute_signature(secret: &str, string_to_sign: &str) -> Result<String, BalanceError> {
    let key = format!("{secret}&");
    let mut hmac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| BalanceError::Signing(format!("Invalid HMAC key: {e}")))?;
    hmac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(hmac.finalize().into_bytes()))
}

/// Sign a request against the endpoint serving the credential's region.
///
/// Unknown regions are signed against the default endpoint.
///
/// # Example
///
/// ```rust
/// use ai_balance_client::auth::{SignedCredential, sign_request};
/// use time::macros::datetime;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credential = SignedCredential::new(
///     "LTAI5tAbCdEfGhIjKlMn",
///     "abcdefghijklmnopqrstuvwxyz0123",
///     "cn-hangzhou",
/// );
/// let request = sign_request(
///     &credential,
///     "QueryAccountBalance",
///     "1700000000000123456",
///     datetime!(2024-05-01 08:30:00 UTC),
/// )?;
/// assert!(request.url.starts_with("https://business.aliyuncs.com/?AccessKeyId="));
/// # Ok(())
/// # }
/// ```
pub fn sign_request(
    credential: &SignedCredential,
    action: &str,
    nonce: &str,
    timestamp: OffsetDateTime,
) -> Result<SignedRequest, BalanceError> {
    let endpoint = aliyun_endpoint_for_region(&credential.region_id);
    sign_request_at(&endpoint, credential, action, nonce, timestamp)
}

/// Sign a request against an explicit endpoint.
pub fn sign_request_at(
    endpoint: &str,
    credential: &SignedCredential,
    action: &str,
    nonce: &str,
    timestamp: OffsetDateTime,
) -> Result<SignedRequest, BalanceError> {
    let mut params: BTreeMap<&str, String> = BTreeMap::new();
    params.insert("AccessKeyId", credential.access_key_id.clone());
    params.insert("Action", action.to_string());
    params.insert("Format", aliyun::FORMAT.to_string());
    params.insert("RegionId", credential.region_id.clone());
    params.insert("SignatureMethod", aliyun::SIGNATURE_METHOD.to_string());
    params.insert("SignatureNonce", nonce.to_string());
    params.insert("SignatureVersion", aliyun::SIGNATURE_VERSION.to_string());
    params.insert("Timestamp", format_timestamp(timestamp)?);
    params.insert("Version", aliyun::API_VERSION.to_string());

    let canonical = canonical_query(&params);
    let signature = compute_signature(credential.expose_secret(), &string_to_sign(&canonical))?;

    let query = params
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .chain(std::iter::once(("Signature", signature.as_str())))
        .map(|(key, value)| format!("{}={}", encode_uri_component(key), encode_uri_component(value)))
        .collect::<Vec<_>>()
        .join("&");
    let url = format!("{}/?{}", endpoint.trim_end_matches('/'), query);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(SignedRequest {
        url,
        headers,
        signature,
    })
}
