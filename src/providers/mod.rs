//! Provider catalog.
//!
//! A static registry of every supported provider. Each entry says where the
//! balance lives, how to authenticate, and what a valid credential looks like.
//!
//! ## Adding a Provider
//!
//! 1. Add a [`ProviderKind`] variant
//! 2. Add a [`ProviderConfig`] entry to the catalog
//! 3. Add its response types to [`types`] and a parse function to [`parser`]
//!
//! Nothing else dispatches on the provider.
//!
//! ## Example
//!
//! ```rust
//! use ai_balance_client::providers::{self, AuthKind};
//!
//! let aliyun = providers::lookup("aliyun").unwrap();
//! assert_eq!(aliyun.auth_kind, AuthKind::AliyunSigned);
//! assert_eq!(providers::lookup_slot(1).unwrap().id, "deepseek");
//! ```

pub mod endpoints;
pub mod parser;
pub mod types;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::BalanceError;

pub use parser::parse;

/// Every provider the catalog knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    DeepSeek,
    OpenRouter,
    Aliyun,
}

impl ProviderKind {
    /// The catalog id of this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::OpenRouter => "openrouter",
            Self::Aliyun => "aliyun",
        }
    }

    /// The catalog entry for this provider.
    pub fn config(&self) -> &'static ProviderConfig {
        match self {
            Self::DeepSeek => &PROVIDERS[0],
            Self::OpenRouter => &PROVIDERS[1],
            Self::Aliyun => &PROVIDERS[2],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = BalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s)
            .map(|config| config.kind)
            .ok_or_else(|| BalanceError::UnknownProvider(s.to_string()))
    }
}

/// How requests to a provider are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// Aliyun RPC-style HMAC-SHA1 signed query string
    AliyunSigned,
}

/// What a valid stored credential looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRules {
    /// A single token string.
    Token {
        /// Required prefix, if any
        prefix: Option<&'static str>,
        /// Minimum length in characters, if any
        min_length: Option<usize>,
    },
    /// A structured access key record.
    Signed {
        /// Required access key id prefix
        key_id_prefix: &'static str,
        /// Allowed access key id length
        key_id_length: RangeInclusive<usize>,
        /// Allowed access key secret length
        secret_length: RangeInclusive<usize>,
    },
}

/// Static configuration of one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Unique catalog key
    pub id: &'static str,
    /// Dispatch variant
    pub kind: ProviderKind,
    /// Short brand name
    pub name: &'static str,
    /// Name shown next to the balance
    pub display_name: &'static str,
    /// Balance endpoint (base URL for signed providers)
    pub endpoint: &'static str,
    /// Where users create credentials
    pub console_url: &'static str,
    /// One-line description for settings screens
    pub description: &'static str,
    /// Authentication scheme
    pub auth_kind: AuthKind,
    /// Credential validation rules
    pub validation: CredentialRules,
    /// Key under which the credential store holds this provider's credential
    pub storage_key: &'static str,
    /// Currency code assumed when the provider does not report one
    pub default_currency: &'static str,
}

/// The catalog, in widget slot order.
pub static PROVIDERS: [ProviderConfig; 3] = [
    ProviderConfig {
        id: "deepseek",
        kind: ProviderKind::DeepSeek,
        name: "DeepSeek",
        display_name: "DeepSeek API",
        endpoint: endpoints::DEEPSEEK_BALANCE_URL,
        console_url: "https://platform.deepseek.com",
        description: "DeepSeek API key, used to query the account balance.",
        auth_kind: AuthKind::Bearer,
        validation: CredentialRules::Token {
            prefix: Some("sk-"),
            min_length: Some(20),
        },
        storage_key: "deepseek_api_key",
        default_currency: "USD",
    },
    ProviderConfig {
        id: "openrouter",
        kind: ProviderKind::OpenRouter,
        name: "OpenRouter",
        display_name: "OpenRouter API",
        endpoint: endpoints::OPENROUTER_CREDITS_URL,
        console_url: "https://openrouter.ai/keys",
        description: "OpenRouter API key, used to query remaining credits.",
        auth_kind: AuthKind::Bearer,
        validation: CredentialRules::Token {
            prefix: Some("sk-or-"),
            min_length: None,
        },
        storage_key: "openrouter_api_key",
        default_currency: "USD",
    },
    ProviderConfig {
        id: "aliyun",
        kind: ProviderKind::Aliyun,
        name: "Aliyun",
        display_name: "Aliyun Balance",
        endpoint: endpoints::ALIYUN_DEFAULT_ENDPOINT,
        console_url: "https://ram.console.aliyun.com/users",
        description: "Aliyun AccessKey ID and Secret, used to query the account balance.",
        auth_kind: AuthKind::AliyunSigned,
        validation: CredentialRules::Signed {
            key_id_prefix: "LTAI",
            key_id_length: 16..=32,
            secret_length: 30..=40,
        },
        storage_key: "aliyun_api_credentials",
        default_currency: "CNY",
    },
];

/// Look up a provider by id.
pub fn lookup(id: &str) -> Option<&'static ProviderConfig> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Look up a provider by its 1-based widget slot.
pub fn lookup_slot(slot: usize) -> Option<&'static ProviderConfig> {
    slot.checked_sub(1).and_then(|i| PROVIDERS.get(i))
}

/// All providers, in slot order.
pub fn all() -> &'static [ProviderConfig] {
    &PROVIDERS
}

/// Storage keys of every provider.
pub fn storage_keys() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|p| p.storage_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup() {
        let config = lookup("openrouter").unwrap();
        assert_eq!(config.kind, ProviderKind::OpenRouter);
        assert_eq!(config.auth_kind, AuthKind::Bearer);
        assert!(lookup("anthropic").is_none());
    }

    #[test]
    fn test_kind_round_trips_through_catalog() {
        for config in all() {
            assert_eq!(config.kind.as_str(), config.id);
            assert_eq!(config.kind.config(), config);
            assert_eq!(config.id.parse::<ProviderKind>().unwrap(), config.kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_configuration_error() {
        let err = "nope".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, BalanceError::UnknownProvider(id) if id == "nope"));
    }

    #[test]
    fn test_slots() {
        assert_eq!(lookup_slot(1).unwrap().id, "deepseek");
        assert_eq!(lookup_slot(3).unwrap().id, "aliyun");
        assert!(lookup_slot(0).is_none());
        assert!(lookup_slot(4).is_none());
    }

    #[test]
    fn test_ids_and_storage_keys_unique() {
        let ids: HashSet<_> = all().iter().map(|p| p.id).collect();
        let keys: HashSet<_> = storage_keys().collect();
        assert_eq!(ids.len(), PROVIDERS.len());
        assert_eq!(keys.len(), PROVIDERS.len());
    }
}
