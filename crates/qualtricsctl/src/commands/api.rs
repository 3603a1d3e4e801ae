//! Connection checks and token minting

use serde_json::json;
use tracing::debug;

use crate::connection::{ConnectionManager, fetch_bearer_token};
use crate::error::Result as CliResult;
use crate::output::{OutputFormat, print_output};

pub async fn handle_whoami(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    let session = conn_mgr.create_session(profile_name, bearer_override).await?;
    debug!(profile = %session.profile_name, "Testing connection");

    let who = session.client.test_connection(session.bearer()).await?;
    print_output(&who, output_format)?;
    Ok(())
}

pub async fn handle_token(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    let (client, oauth) = conn_mgr.oauth_client(profile_name)?;
    let scope = oauth.scope.clone();
    let token = fetch_bearer_token(&client, oauth).await?;

    print_output(
        json!({
            "access_token": token,
            "scope": scope,
        }),
        output_format,
    )?;
    Ok(())
}
