//! Credential resolution with optional keyring support
//!
//! Secrets in a profile are stored in one of three forms:
//! - a plain value
//! - `keyring:<key>`, looked up in the OS keyring (feature `secure-storage`)
//! - `${VAR}`, already expanded when the config file is loaded
//!
//! A well-known environment variable, when set, overrides all of them.

use super::error::{ConfigError, Result};
use std::env;

/// Prefix that indicates a value should be retrieved from the keyring
const KEYRING_PREFIX: &str = "keyring:";

/// Service name for keyring entries
#[cfg(feature = "secure-storage")]
const SERVICE_NAME: &str = "qualtricsctl";

/// Where a resolved secret came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keyring,
    Plaintext,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Keyring => write!(f, "keyring"),
            CredentialSource::Plaintext => write!(f, "plaintext"),
        }
    }
}

/// Resolves and stores profile secrets
#[derive(Debug, Default, Clone, Copy)]
pub struct CredentialStore;

impl CredentialStore {
    pub fn new() -> Self {
        Self
    }

    /// Check if a value is a keyring reference
    pub fn is_keyring_reference(value: &str) -> bool {
        value.starts_with(KEYRING_PREFIX)
    }

    /// Describe where `value` would be resolved from
    pub fn source_of(value: &str, env_var: Option<&str>) -> CredentialSource {
        if env_var.is_some_and(|var| env::var(var).is_ok()) {
            CredentialSource::Environment
        } else if Self::is_keyring_reference(value) {
            CredentialSource::Keyring
        } else {
            CredentialSource::Plaintext
        }
    }

    /// Resolve a stored credential value
    ///
    /// Resolution order:
    /// 1. Environment variable (if `env_var` is given and set)
    /// 2. Keyring, if the value starts with `keyring:`
    /// 3. The value itself
    pub fn resolve(&self, value: &str, env_var: Option<&str>) -> Result<String> {
        if let Some(var) = env_var
            && let Ok(env_value) = env::var(var)
        {
            return Ok(env_value);
        }

        match value.strip_prefix(KEYRING_PREFIX) {
            Some(key) => self.read_keyring(key),
            None => Ok(value.to_string()),
        }
    }

    /// Resolve an optional credential, falling back to `env_var` when unset
    pub fn resolve_optional(
        &self,
        value: Option<&str>,
        env_var: Option<&str>,
    ) -> Result<Option<String>> {
        match value {
            Some(value) => self.resolve(value, env_var).map(Some),
            None => Ok(env_var.and_then(|var| env::var(var).ok())),
        }
    }

    /// Store a secret for `profile`, returning the value to write into the config
    ///
    /// With `secure-storage` the secret goes to the keyring and a
    /// `keyring:` reference comes back; otherwise the secret is returned as-is.
    pub fn store(&self, profile: &str, field: &str, secret: &str) -> Result<String> {
        #[cfg(feature = "secure-storage")]
        {
            let key = format!("{profile}:{field}");
            let entry = keyring::Entry::new(SERVICE_NAME, &key)
                .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
            entry.set_password(secret).map_err(|e| {
                ConfigError::KeyringError(format!("Failed to store '{key}' in keyring: {e}"))
            })?;
            Ok(format!("{KEYRING_PREFIX}{key}"))
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            let _ = (profile, field);
            Ok(secret.to_string())
        }
    }

    /// Remove a keyring entry referenced by `value`; plain values are ignored
    pub fn forget(&self, value: &str) -> Result<()> {
        let Some(key) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(());
        };

        #[cfg(feature = "secure-storage")]
        {
            let entry = keyring::Entry::new(SERVICE_NAME, key)
                .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(ConfigError::KeyringError(format!(
                    "Failed to delete '{key}' from keyring: {e}"
                ))),
            }
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            let _ = key;
            Ok(())
        }
    }

    #[cfg(feature = "secure-storage")]
    fn read_keyring(&self, key: &str) -> Result<String> {
        let entry = keyring::Entry::new(SERVICE_NAME, key)
            .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
        entry.get_password().map_err(|e| {
            ConfigError::KeyringError(format!(
                "Failed to retrieve credential '{key}' from keyring: {e}"
            ))
        })
    }

    #[cfg(not(feature = "secure-storage"))]
    fn read_keyring(&self, key: &str) -> Result<String> {
        Err(ConfigError::CredentialError(format!(
            "'{key}' references the keyring but the secure-storage feature is not enabled"
        )))
    }
}
