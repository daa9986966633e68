//! Credential store abstraction.
//!
//! The store itself belongs to the host (a keychain, app storage, a file).
//! The client only needs opaque string get/set/remove by key, with keys taken
//! from [`ProviderConfig::storage_key`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

use crate::auth::{self, Credential};
use crate::error::ValidationError;
use crate::providers::{self, ProviderConfig};

/// Key-value storage for credential strings.
pub trait CredentialStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Validate a credential and persist its canonical encoding.
///
/// Nothing is written when validation fails.
pub fn save_credential<S>(
    store: &S,
    config: &ProviderConfig,
    raw: &str,
) -> Result<Credential, ValidationError>
where
    S: CredentialStore + ?Sized,
{
    let credential = auth::decode(config, raw)?;
    store.set(config.storage_key, &auth::encode(&credential));
    info!(provider = config.id, "Saved credential");
    Ok(credential)
}

/// Whether a credential is stored for the provider.
pub fn has_credential<S>(store: &S, config: &ProviderConfig) -> bool
where
    S: CredentialStore + ?Sized,
{
    store.get(config.storage_key).is_some()
}

/// Remove the provider's credential.
pub fn clear_credential<S>(store: &S, config: &ProviderConfig)
where
    S: CredentialStore + ?Sized,
{
    store.remove(config.storage_key);
    info!(provider = config.id, "Cleared credential");
}

/// Move every catalog credential from a legacy store into the current one.
///
/// Non-empty values found in `legacy` overwrite whatever `current` holds and
/// are then removed from `legacy`. Empty legacy values are left alone. Returns how many credentials were moved.
pub fn migrate_legacy<L, C>(legacy: &L, current: &C) -> usize
where
    L: CredentialStore + ?Sized,
    C: CredentialStore + ?Sized,
{
    let mut migrated = 0;
    for config in providers::all() {
        if let Some(value) = legacy.get(config.storage_key).filter(|v| !v.is_empty()) {
            current.set(config.storage_key, &value);
            legacy.remove(config.storage_key);
            migrated += 1;
            info!(provider = config.id, "Migrated credential from legacy store");
        }
    }

    if migrated == 0 {
        debug!("No legacy credentials to migrate");
    }
    migrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("k", "v1");
        store.set("k", "v2");
        assert_eq!(store.get("k").as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k");
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_save_credential_writes_canonical_form() {
        let store = MemoryStore::new();
        let config = ProviderKind::Aliyun.config();
        let raw = r#"{ "regionId": " cn-shanghai ",
                      "accessKeyId": "LTAI5tAbCdEfGhIjKlMn",
                      "accessKeySecret": "abcdefghijklmnopqrstuvwxyz0123" }"#;

        save_credential(&store, config, raw).unwrap();
        assert_eq!(
            store.get("aliyun_api_credentials").as_deref(),
            Some(
                r#"{"accessKeyId":"LTAI5tAbCdEfGhIjKlMn","accessKeySecret":"abcdefghijklmnopqrstuvwxyz0123","regionId":"cn-shanghai"}"#
            )
        );
        assert!(has_credential(&store, config));
    }

    #[test]
    fn test_save_invalid_credential_writes_nothing() {
        let store = MemoryStore::new();
        let config = ProviderKind::DeepSeek.config();

        assert_eq!(
            save_credential(&store, config, ""),
            Err(ValidationError::EmptyCredential)
        );
        assert!(!has_credential(&store, config));
    }

    #[test]
    fn test_clear_credential() {
        let store = MemoryStore::new();
        let config = ProviderKind::OpenRouter.config();
        save_credential(&store, config, "sk-or-v1-abc").unwrap();

        clear_credential(&store, config);
        assert!(!has_credential(&store, config));
    }

    #[test]
    fn test_migrate_legacy() {
        let legacy = MemoryStore::new();
        let current = MemoryStore::new();
        legacy.set("deepseek_api_key", "sk-legacy-0123456789abc");
        legacy.set("unrelated", "keep me");
        current.set("deepseek_api_key", "sk-stale");
        current.set("openrouter_api_key", "sk-or-current");

        assert_eq!(migrate_legacy(&legacy, &current), 1);
        assert_eq!(
            current.get("deepseek_api_key").as_deref(),
            Some("sk-legacy-0123456789abc")
        );
        assert_eq!(current.get("openrouter_api_key").as_deref(), Some("sk-or-current"));
        assert!(legacy.get("deepseek_api_key").is_none());
        assert_eq!(legacy.get("unrelated").as_deref(), Some("keep me"));

        assert_eq!(migrate_legacy(&legacy, &current), 0);
    }

    #[test]
    fn test_migrate_legacy_skips_empty_values() {
        let legacy = MemoryStore::new();
        let current = MemoryStore::new();
        legacy.set("openrouter_api_key", "");
        current.set("openrouter_api_key", "sk-or-current");

        assert_eq!(migrate_legacy(&legacy, &current), 0);
        assert_eq!(current.get("openrouter_api_key").as_deref(), Some("sk-or-current"));
    }
}
