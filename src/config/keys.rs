//! # Unseal Key Loading
//!
//! Key shares are opaque strings forwarded as-is to `PUT /v1/sys/unseal`.
//! They are held in [`UnsealKey`], which wipes its buffer on drop and never
//! prints its contents.

use crate::constants::{ENV_LEGACY_UNSEAL_KEY_PREFIX, ENV_UNSEAL_KEYS, ENV_UNSEAL_KEY_PREFIX};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A single unseal key share
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct UnsealKey(String);

impl UnsealKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key material, only for building the unseal request body
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for UnsealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UnsealKey(<redacted>)")
    }
}

impl From<String> for UnsealKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for UnsealKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

/// Load unseal keys from the process environment
///
/// Sources are tried in order and the first non-empty one wins:
/// 1. `VAULT_UNSEAL_KEYS` (comma-separated)
/// 2. `VAULT_UNSEAL_KEY_1`, `VAULT_UNSEAL_KEY_2`, ...
/// 3. `UNSEAL_KEY_1`, `UNSEAL_KEY_2`, ... (legacy names)
pub fn load_keys_from_env() -> Vec<UnsealKey> {
    load_keys_with(|name| std::env::var(name).ok())
}

/// Load unseal keys through an arbitrary variable lookup
pub fn load_keys_with<F>(lookup: F) -> Vec<UnsealKey>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(joined) = lookup(ENV_UNSEAL_KEYS) {
        let keys: Vec<UnsealKey> = joined
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(UnsealKey::from)
            .collect();
        if !keys.is_empty() {
            return keys;
        }
    }

    let keys = numbered_keys(&lookup, ENV_UNSEAL_KEY_PREFIX);
    if !keys.is_empty() {
        return keys;
    }

    numbered_keys(&lookup, ENV_LEGACY_UNSEAL_KEY_PREFIX)
}

/// Collect `{prefix}1`, `{prefix}2`, ... until the first missing or empty index
fn numbered_keys<F>(lookup: &F, prefix: &str) -> Vec<UnsealKey>
where
    F: Fn(&str) -> Option<String>,
{
    (1..)
        .map(|i| lookup(&format!("{prefix}{i}")))
        .take_while(|v| v.as_deref().is_some_and(|k| !k.is_empty()))
        .flatten()
        .map(UnsealKey::from)
        .collect()
}
