//! Profile management command implementations

use anyhow::Context;
use qualtrics_core::config::{
    Config, CredentialSource, CredentialStore, ENV_API_TOKEN, ENV_CLIENT_SECRET, Profile,
};
use qualtrics_core::ApiVersion;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::cli::ProfileCommands;
use crate::connection::ConnectionManager;
use crate::error::{QualtricsCtlError, Result as CliResult};
use crate::output::{OutputFormat, print_output};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            datacenter_id,
            api_token,
            client_id,
            client_secret,
            scope,
            base_url,
            api_version,
            timeout_secs,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            #[cfg(feature = "secure-storage")]
            let use_keyring = *use_keyring;
            #[cfg(not(feature = "secure-storage"))]
            let use_keyring = false;

            let args = SetArgs {
                name,
                datacenter_id,
                api_token: api_token.as_deref(),
                client_id: client_id.as_deref(),
                client_secret: client_secret.as_deref(),
                scope: scope.as_deref(),
                base_url: base_url.as_deref(),
                api_version: *api_version,
                timeout_secs: *timeout_secs,
                use_keyring,
            };
            handle_set(conn_mgr, &args)
        }
        Remove { name, yes } => handle_remove(conn_mgr, name, *yes),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn config_path_display(conn_mgr: &ConnectionManager) -> Option<String> {
    conn_mgr
        .config_path
        .clone()
        .or_else(|| Config::config_path().ok())
        .map(|p| p.display().to_string())
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let profiles = conn_mgr.config.list_profiles();
    debug!("Found {} profiles", profiles.len());

    let default = conn_mgr.config.default_profile.as_deref();
    let profile_list: Vec<Value> = profiles
        .iter()
        .map(|(name, profile)| {
            json!({
                "name": name,
                "datacenter_id": profile.datacenter_id,
                "auth": auth_kind(profile),
                "is_default": default == Some(name.as_str()),
            })
        })
        .collect();

    print_output(
        json!({
            "config_path": config_path_display(conn_mgr),
            "profiles": profile_list,
            "count": profiles.len(),
        }),
        output_format,
    )?;
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    print_output(
        json!({ "config_path": config_path_display(conn_mgr) }),
        output_format,
    )?;
    Ok(())
}

fn auth_kind(profile: &Profile) -> &'static str {
    match (profile.api_token.is_some(), profile.has_oauth_client()) {
        (true, true) => "api_token+oauth",
        (true, false) => "api_token",
        (false, true) => "oauth",
        (false, false) => "none",
    }
}

/// Masked description of a secret and where it resolves from
fn describe_secret(value: Option<&str>, env_var: &str) -> Value {
    match value {
        Some(value) => json!({
            "value": mask_secret(value),
            "source": CredentialStore::source_of(value, Some(env_var)).to_string(),
        }),
        None => Value::Null,
    }
}

fn mask_secret(value: &str) -> String {
    if CredentialStore::is_keyring_reference(value) {
        return value.to_string();
    }
    let visible: String = value.chars().take(4).collect();
    if value.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    let profile = conn_mgr.config.profile(name)?;

    let mut output = json!({
        "name": name,
        "datacenter_id": profile.datacenter_id,
        "api_version": profile.api_version.unwrap_or_default(),
        "is_default": conn_mgr.config.default_profile.as_deref() == Some(name),
        "api_token": describe_secret(profile.api_token.as_deref(), ENV_API_TOKEN),
    });

    if let Some(client_id) = &profile.client_id {
        output["client_id"] = json!(client_id);
        output["client_secret"] =
            describe_secret(profile.client_secret.as_deref(), ENV_CLIENT_SECRET);
        output["scope"] = json!(
            profile
                .scope
                .as_deref()
                .unwrap_or(qualtrics_core::config::DEFAULT_SCOPE)
        );
    }
    if let Some(base_url) = &profile.base_url {
        output["base_url"] = json!(base_url);
    }
    if let Some(timeout) = profile.timeout_secs {
        output["timeout_secs"] = json!(timeout);
    }

    print_output(output, output_format)?;
    Ok(())
}

struct SetArgs<'a> {
    name: &'a str,
    datacenter_id: &'a str,
    api_token: Option<&'a str>,
    client_id: Option<&'a str>,
    client_secret: Option<&'a str>,
    scope: Option<&'a str>,
    base_url: Option<&'a str>,
    api_version: Option<ApiVersion>,
    timeout_secs: Option<u64>,
    use_keyring: bool,
}

fn handle_set(conn_mgr: &ConnectionManager, args: &SetArgs<'_>) -> CliResult<()> {
    debug!("Setting profile: {}", args.name);

    if args.datacenter_id.trim().is_empty() {
        return Err(QualtricsCtlError::InvalidInput {
            message: "--datacenter-id must not be empty".to_string(),
        });
    }

    // Prompt for the client secret if an OAuth client is being configured without one
    let client_secret = match (args.client_id, args.client_secret) {
        (Some(_), Some(secret)) => Some(secret.to_string()),
        (Some(_), None) => Some(
            rpassword::prompt_password("Enter client secret: ")
                .context("Failed to read client secret")?,
        ),
        (None, _) => None,
    };

    let store = CredentialStore::new();
    let save_secret = |field: &str, secret: Option<String>| -> CliResult<Option<String>> {
        match secret {
            Some(secret) if args.use_keyring => {
                let reference = store.store(args.name, field, &secret)?;
                info!("Stored {} for '{}' in the OS keyring", field, args.name);
                Ok(Some(reference))
            }
            other => Ok(other),
        }
    };

    let mut profile = conn_mgr
        .config
        .profiles
        .get(args.name)
        .cloned()
        .unwrap_or_default();
    profile.datacenter_id = args.datacenter_id.to_string();
    if let Some(token) = save_secret("api_token", args.api_token.map(str::to_string))? {
        profile.api_token = Some(token);
    }
    if let Some(client_id) = args.client_id {
        profile.client_id = Some(client_id.to_string());
        profile.client_secret = save_secret("client_secret", client_secret)?;
    }
    if let Some(scope) = args.scope {
        profile.scope = Some(scope.to_string());
    }
    if let Some(base_url) = args.base_url {
        profile.base_url = Some(base_url.to_string());
    }
    if args.api_version.is_some() {
        profile.api_version = args.api_version;
    }
    if args.timeout_secs.is_some() {
        profile.timeout_secs = args.timeout_secs;
    }

    let mut config = conn_mgr.config.clone();
    let is_first = config.profiles.is_empty();
    config.set_profile(args.name.to_string(), profile);
    if is_first {
        config.default_profile = Some(args.name.to_string());
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    println!("Profile '{}' saved successfully.", args.name);
    if is_first {
        println!("Set as default profile.");
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str, yes: bool) -> CliResult<()> {
    debug!("Removing profile: {}", name);
    conn_mgr.config.profile(name)?;

    if !yes {
        print!(
            "Are you sure you want to remove profile '{}'? (y/N): ",
            name
        );
        use std::io::{self, Write};
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Profile removal cancelled.");
            return Ok(());
        }
    }

    let mut config = conn_mgr.config.clone();
    let was_default = config.default_profile.as_deref() == Some(name);
    if let Some(removed) = config.remove_profile(name) {
        let store = CredentialStore::new();
        for secret in [removed.api_token, removed.client_secret].into_iter().flatten() {
            if CredentialStore::source_of(&secret, None) == CredentialSource::Keyring {
                store.forget(&secret)?;
            }
        }
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    if was_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    conn_mgr.config.profile(name)?;

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("abcdefghijkl"), "abcd****");
        assert_eq!(mask_secret("keyring:prod:api_token"), "keyring:prod:api_token");
    }

    #[test]
    fn test_auth_kind() {
        let mut profile = Profile {
            datacenter_id: "iad1".to_string(),
            ..Profile::default()
        };
        assert_eq!(auth_kind(&profile), "none");

        profile.client_id = Some("client".to_string());
        profile.client_secret = Some("secret".to_string());
        assert_eq!(auth_kind(&profile), "oauth");

        profile.api_token = Some("token".to_string());
        assert_eq!(auth_kind(&profile), "api_token+oauth");
    }
}
