//! Error types for the balance client.
//!
//! None of these escape [`BalanceFetcher::fetch`](crate::client::BalanceFetcher::fetch):
//! the fetcher renders them into the `error` field of a
//! [`BalanceRecord`](crate::types::BalanceRecord). They are public so hosts
//! can validate credentials before saving them and so custom transports can
//! report failures in the same vocabulary.

use std::time::Duration;

use thiserror::Error;

/// The main error type for all balance client operations.
#[derive(Error, Debug)]
pub enum BalanceError {
    /// Stored credential failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Network-level failure (DNS, connect, timeout)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Provider answered with a non-2xx status
    #[error("HTTP {status}: {snippet}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Leading characters of the response body
        snippet: String,
    },

    /// Provider answered 2xx but reported a business failure
    #[error("{0}")]
    ProviderApi(ApiError),

    /// Request signing failed
    #[error("Failed to sign request: {0}")]
    Signing(String),

    /// Provider id is not in the catalog
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Credential store has nothing for this provider
    #[error("No credential configured for {provider}")]
    MissingCredential {
        /// Display name of the provider
        provider: String,
    },
}

/// Credential validation failures.
///
/// Messages are written for the end user, who is the only one able to fix them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Bearer token is empty after trimming
    #[error("API key is empty")]
    EmptyCredential,

    /// A required field of a structured credential is empty
    #[error("{field} is empty")]
    EmptyField {
        /// Human-readable field name
        field: &'static str,
    },

    /// Signed credential has no region
    #[error("Region must be selected")]
    MissingRegion,

    /// Value does not start with the required prefix
    #[error("{field} must start with \"{prefix}\"")]
    PrefixMismatch {
        /// Human-readable field name
        field: &'static str,
        /// Required prefix
        prefix: &'static str,
    },

    /// Value is below the configured minimum length
    #[error("{field} is too short, at least {min} characters required")]
    TooShort {
        /// Human-readable field name
        field: &'static str,
        /// Minimum length in characters
        min: usize,
    },

    /// Value length is outside the allowed range
    #[error("{field} must be {min}-{max} characters long")]
    LengthOutOfRange {
        /// Human-readable field name
        field: &'static str,
        /// Minimum length in characters
        min: usize,
        /// Maximum length in characters
        max: usize,
    },

    /// Stored string is not a structured credential
    #[error("Invalid credential format: {0}")]
    MalformedCredential(String),
}

/// Failures below the HTTP layer.
///
/// Every variant renders with a `Network error` prefix so a host can tell
/// them apart from [`BalanceError::Http`] by message alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The single attempt did not finish in time
    #[error("Network error: request timed out after {}s", .after.as_secs())]
    Timeout {
        /// The bound that expired
        after: Duration,
    },

    /// Could not reach the host
    #[error("Network error: {0}")]
    Connect(String),

    /// Any other failure while sending or reading the response
    #[error("Network error: {0}")]
    Request(String),
}

/// Business failure reported inside a 2xx provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Provider error code, when one was returned (e.g., "SignatureDoesNotMatch")
    pub code: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build an error from an Aliyun response, preferring the provider message.
    ///
    /// Falls back to a code-based message, and to a generic one when the
    /// response carried neither.
    pub fn from_aliyun(code: Option<&str>, message: Option<&str>) -> Self {
        let message = match (message.filter(|m| !m.is_empty()), code) {
            (Some(message), _) => message.to_string(),
            (None, Some(code)) => format!("Aliyun API error: {code}"),
            (None, None) => "Aliyun API request failed".to_string(),
        };
        Self::new(code.map(str::to_string), message)
    }

    /// Check if the provider rejected the request signature.
    pub fn is_invalid_signature(&self) -> bool {
        self.code.as_deref() == Some(error_codes::SIGNATURE_DOES_NOT_MATCH)
    }

    /// Check if the provider does not know the access key.
    pub fn is_invalid_key(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|c| c.starts_with(error_codes::INVALID_ACCESS_KEY_ID))
    }

    /// Check if the request was throttled.
    pub fn is_throttled(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|c| c.starts_with(error_codes::THROTTLING))
    }
}

/// Known Aliyun error codes for pattern matching.
pub mod error_codes {
    pub const SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";
    pub const INVALID_ACCESS_KEY_ID: &str = "InvalidAccessKeyId";
    pub const THROTTLING: &str = "Throttling";
}
