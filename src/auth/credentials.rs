//! Credential decoding, validation and encoding.
//!
//! The credential store holds one opaque string per provider: the bare token
//! for bearer providers, and a small JSON object for Aliyun:
//!
//! ```json
//! {"accessKeyId":"LTAI...","accessKeySecret":"...","regionId":"cn-hangzhou"}
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::providers::{CredentialRules, ProviderConfig};

const API_KEY: &str = "API key";
const ACCESS_KEY_ID: &str = "AccessKey ID";
const ACCESS_KEY_SECRET: &str = "AccessKey Secret";

/// A bearer token.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Get the token for the `Authorization` header.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for BearerToken {}

/// Access key credentials for signed requests.
#[derive(Clone)]
pub struct SignedCredential {
    /// The access key id (public identifier)
    pub access_key_id: String,
    /// The access key secret (private, used for signing)
    access_key_secret: SecretString,
    /// Region the account belongs to
    pub region_id: String,
}

impl SignedCredential {
    /// Create new signed credentials.
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        region_id: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: SecretString::from(access_key_secret.into()),
            region_id: region_id.into(),
        }
    }

    /// Get the access key secret for signing.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.access_key_secret.expose_secret()
    }
}

impl std::fmt::Debug for SignedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCredential")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"[REDACTED]")
            .field("region_id", &self.region_id)
            .finish()
    }
}

impl PartialEq for SignedCredential {
    fn eq(&self, other: &Self) -> bool {
        self.access_key_id == other.access_key_id
            && self.expose_secret() == other.expose_secret()
            && self.region_id == other.region_id
    }
}

impl Eq for SignedCredential {}

/// Decoded credential material for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Sent as `Authorization: Bearer <token>`
    Bearer(BearerToken),
    /// Used to sign the request query string
    Signed(SignedCredential),
}

/// Stored form of a signed credential.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSignedCredential {
    access_key_id: String,
    access_key_secret: String,
    region_id: String,
}

/// Decode and validate a stored credential string for a provider.
pub fn decode(config: &ProviderConfig, raw: &str) -> Result<Credential, ValidationError> {
    match &config.validation {
        CredentialRules::Token { prefix, min_length } => {
            let token = raw.trim();
            if token.is_empty() {
                return Err(ValidationError::EmptyCredential);
            }
            if let Some(prefix) = *prefix {
                if !token.starts_with(prefix) {
                    return Err(ValidationError::PrefixMismatch {
                        field: API_KEY,
                        prefix,
                    });
                }
            }
            if let Some(min) = *min_length {
                if token.chars().count() < min {
                    return Err(ValidationError::TooShort {
                        field: API_KEY,
                        min,
                    });
                }
            }
            Ok(Credential::Bearer(BearerToken::new(token)))
        }
        CredentialRules::Signed {
            key_id_prefix,
            key_id_length,
            secret_length,
        } => {
            let stored: StoredSignedCredential = serde_json::from_str(raw.trim()).map_err(|_| {
                ValidationError::MalformedCredential(
                    "expected a JSON object with accessKeyId, accessKeySecret and regionId"
                        .to_string(),
                )
            })?;

            let key_id = stored.access_key_id.trim();
            let secret = stored.access_key_secret.trim();
            let region = stored.region_id.trim();

            if key_id.is_empty() {
                return Err(ValidationError::EmptyField {
                    field: ACCESS_KEY_ID,
                });
            }
            if secret.is_empty() {
                return Err(ValidationError::EmptyField {
                    field: ACCESS_KEY_SECRET,
                });
            }
            if region.is_empty() {
                return Err(ValidationError::MissingRegion);
            }
            if !key_id.starts_with(key_id_prefix) {
                return Err(ValidationError::PrefixMismatch {
                    field: ACCESS_KEY_ID,
                    prefix: *key_id_prefix,
                });
            }
            if !key_id_length.contains(&key_id.chars().count()) {
                return Err(ValidationError::LengthOutOfRange {
                    field: ACCESS_KEY_ID,
                    min: *key_id_length.start(),
                    max: *key_id_length.end(),
                });
            }
            if !secret_length.contains(&secret.chars().count()) {
                return Err(ValidationError::LengthOutOfRange {
                    field: ACCESS_KEY_SECRET,
                    min: *secret_length.start(),
                    max: *secret_length.end(),
                });
            }

            // Unknown regions are accepted; signing falls back to the default endpoint.
            Ok(Credential::Signed(SignedCredential::new(key_id, secret, region)))
        }
    }
}

/// Encode a credential into the string form kept by the credential store.
pub fn encode(credential: &Credential) -> String {
    match credential {
        Credential::Bearer(token) => token.expose_secret().to_string(),
        Credential::Signed(signed) => serde_json::json!({
            "accessKeyId": signed.access_key_id,
            "accessKeySecret": signed.expose_secret(),
            "regionId": signed.region_id,
        })
        .to_string(),
    }
}
