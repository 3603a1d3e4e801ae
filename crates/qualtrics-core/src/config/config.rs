//! Profile configuration for Qualtrics tools
//!
//! Configuration is stored in TOML with any number of named profiles, each
//! describing one Qualtrics datacenter and the credentials used against it.
//!
//! ```toml
//! default_profile = "prod"
//!
//! [profiles.prod]
//! datacenter_id = "iad1"
//! api_token = "${QUALTRICS_PROD_TOKEN}"
//! timeout_secs = 60
//!
//! [profiles.oauth]
//! datacenter_id = "fra1"
//! client_id = "my-client"
//! client_secret = "keyring:oauth:client_secret"
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::options::{ApiVersion, ConnectionOptions, DEFAULT_TIMEOUT, PollPolicy};

/// Overrides the profile's datacenter
pub const ENV_DATACENTER_ID: &str = "QUALTRICS_DATACENTER_ID";
/// Overrides the profile's API token
pub const ENV_API_TOKEN: &str = "QUALTRICS_API_TOKEN";
/// Overrides the profile's OAuth client id
pub const ENV_CLIENT_ID: &str = "QUALTRICS_CLIENT_ID";
/// Overrides the profile's OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "QUALTRICS_CLIENT_SECRET";

/// Default OAuth scope requested by `get_bearer_token`
pub const DEFAULT_SCOPE: &str = "manage:all";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Profile used when none is given explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One Qualtrics datacenter and its credentials
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Profile {
    /// Datacenter id, e.g. `iad1`
    pub datacenter_id: String,
    /// API token. Supports `keyring:` references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// OAuth client id for `get_bearer_token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth client secret. Supports `keyring:` references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// OAuth scope, defaults to `manage:all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Override for `https://{datacenter_id}.qualtrics.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_max_attempts: Option<u32>,
}

/// OAuth client credentials resolved from a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl Profile {
    /// Check if this profile carries OAuth client credentials
    pub fn has_oauth_client(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Build connection options, resolving secrets and environment overrides
    pub fn connection_options(&self) -> Result<ConnectionOptions> {
        let store = CredentialStore::new();

        let datacenter_id = store
            .resolve(&self.datacenter_id, Some(ENV_DATACENTER_ID))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve datacenter id: {}", e))
            })?;
        let api_token = store
            .resolve_optional(self.api_token.as_deref(), Some(ENV_API_TOKEN))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve API token: {}", e))
            })?;

        let defaults = PollPolicy::default();
        let poll_policy = PollPolicy::new(
            self.poll_interval_secs
                .map_or(defaults.interval, Duration::from_secs),
            self.poll_max_attempts.unwrap_or(defaults.max_attempts),
        );

        Ok(ConnectionOptions {
            datacenter_id,
            api_token: api_token.filter(|t| !t.is_empty()),
            timeout: self
                .timeout_secs
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            base_url: self.base_url.clone(),
            api_version: self.api_version.unwrap_or_default(),
            poll_policy,
        })
    }

    /// Resolve OAuth client credentials, if the profile (or environment) has them
    pub fn resolve_oauth_client(&self) -> Result<Option<OAuthClient>> {
        let store = CredentialStore::new();

        let client_id = store
            .resolve_optional(self.client_id.as_deref(), Some(ENV_CLIENT_ID))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve client id: {}", e))
            })?;
        let client_secret = store
            .resolve_optional(self.client_secret.as_deref(), Some(ENV_CLIENT_SECRET))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve client secret: {}", e))
            })?;

        Ok(match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(OAuthClient {
                client_id,
                client_secret,
                scope: self
                    .scope
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            }),
            _ => None,
        })
    }
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file is an empty configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);
        let config: Config = toml::from_str(&expanded_content)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve which profile to use
    ///
    /// Order: explicit name, then `default_profile`, then the first profile by name.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            self.profile(profile_name)?;
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            self.profile(default)?;
            return Ok(default.clone());
        }

        self.list_profiles()
            .first()
            .map(|(name, _)| (*name).clone())
            .ok_or(ConfigError::NoProfiles)
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/qualtricsctl/config.toml` is preferred when it exists,
    /// falling back to the platform location.
    ///
    /// On Linux: ~/.config/qualtricsctl/config.toml
    /// On Windows: %APPDATA%\qualtrics\qualtricsctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("qualtricsctl")
                    .join("config.toml");

                if linux_style_path.parent().is_some_and(Path::exists) {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs = ProjectDirs::from("com", "qualtrics", "qualtricsctl")
            .ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        for (name, profile) in &self.profiles {
            if profile.datacenter_id.trim().is_empty() {
                return Err(ConfigError::InvalidProfile {
                    name: name.clone(),
                    reason: "datacenter_id is empty".to_string(),
                });
            }
            if profile.client_id.is_some() != profile.client_secret.is_some() {
                return Err(ConfigError::InvalidProfile {
                    name: name.clone(),
                    reason: "client_id and client_secret must be set together".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Expand `${VAR}` and `${VAR:-default}` references in configuration content
    ///
    /// Unset variables without a default are left as-is, so a profile that is
    /// never used does not need its variables set.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok())
            .to_string()
    }
}
