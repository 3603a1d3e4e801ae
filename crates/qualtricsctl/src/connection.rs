//! Connection management for Qualtrics clients

use std::path::PathBuf;

use anyhow::Context;
use qualtrics_core::config::{
    Config, ConfigError, ENV_API_TOKEN, ENV_CLIENT_ID, ENV_DATACENTER_ID, OAuthClient, Profile,
};
use qualtrics_core::{BearerTokenRequest, QualtricsClient};
use tracing::{debug, info, trace};

use crate::error::{QualtricsCtlError, Result as CliResult};

/// Name reported for a session built purely from environment variables
const ENV_PROFILE_NAME: &str = "<environment>";

/// An authenticated client plus the bearer token to pass to each operation
pub struct Session {
    pub profile_name: String,
    pub client: QualtricsClient,
    pub bearer_token: Option<String>,
}

impl Session {
    pub fn bearer(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the file it was loaded from
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Resolve the profile to connect with.
    ///
    /// With no profiles configured and no `--config-file`, an environment-only
    /// profile is used when `QUALTRICS_DATACENTER_ID` is set.
    pub fn resolve_profile(&self, profile_name: Option<&str>) -> CliResult<(String, Profile)> {
        match self.config.resolve_profile(profile_name) {
            Ok(name) => {
                let profile = self.config.profile(&name)?.clone();
                Ok((name, profile))
            }
            Err(ConfigError::NoProfiles) if self.config_path.is_none() => {
                if std::env::var(ENV_DATACENTER_ID).is_err() {
                    return Err(QualtricsCtlError::NoProfileConfigured);
                }
                info!("No profiles configured, using environment variables");
                Ok((ENV_PROFILE_NAME.to_string(), Profile::default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Build a client for the profile.
    ///
    /// Credential precedence: `bearer_override`, then the profile's API token,
    /// then a bearer token fetched with the profile's OAuth client.
    pub async fn create_session(
        &self,
        profile_name: Option<&str>,
        bearer_override: Option<&str>,
    ) -> CliResult<Session> {
        let (name, profile) = self.resolve_profile(profile_name)?;
        info!("Using Qualtrics profile: {}", name);
        trace!(
            "API token env set: {}, client id env set: {}",
            std::env::var(ENV_API_TOKEN).is_ok(),
            std::env::var(ENV_CLIENT_ID).is_ok()
        );

        let mut options = profile.connection_options()?;
        if bearer_override.is_some() {
            // The API token would otherwise win header selection
            options.api_token = None;
        }
        debug!(
            datacenter = %options.datacenter_id,
            api_version = ?options.api_version,
            "Resolved connection options"
        );
        let has_api_token = options.api_token.is_some();
        let client = QualtricsClient::new(options)?;

        let bearer_token = if let Some(token) = bearer_override {
            debug!("Using bearer token from command line");
            Some(token.to_string())
        } else if has_api_token {
            None
        } else if let Some(oauth) = profile.resolve_oauth_client()? {
            debug!("No API token, exchanging OAuth client credentials");
            Some(fetch_bearer_token(&client, oauth).await?)
        } else {
            return Err(QualtricsCtlError::MissingCredentials { name });
        };

        Ok(Session {
            profile_name: name,
            client,
            bearer_token,
        })
    }

    /// Client plus OAuth client credentials, for minting bearer tokens
    pub fn oauth_client(
        &self,
        profile_name: Option<&str>,
    ) -> CliResult<(QualtricsClient, OAuthClient)> {
        let (name, profile) = self.resolve_profile(profile_name)?;
        let oauth = profile
            .resolve_oauth_client()?
            .ok_or_else(|| QualtricsCtlError::InvalidInput {
                message: format!("Profile '{}' has no OAuth client_id/client_secret", name),
            })?;
        let client = QualtricsClient::new(profile.connection_options()?)?;
        Ok((client, oauth))
    }
}

pub async fn fetch_bearer_token(client: &QualtricsClient, oauth: OAuthClient) -> CliResult<String> {
    let token = client
        .get_bearer_token(&BearerTokenRequest {
            client_id: oauth.client_id,
            client_secret: oauth.client_secret,
            scope: oauth.scope,
        })
        .await?;
    Ok(token)
}
