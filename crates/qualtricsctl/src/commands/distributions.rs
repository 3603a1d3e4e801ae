//! Mailing list, distribution and library commands

use std::path::Path;

use qualtrics_core::{
    CreateMailingListOptions, DistributionOptions, ListDistributionsOptions,
    ListLibraryMessagesOptions, distribute_surveys,
};
use serde_json::json;
use tracing::{debug, info};

use crate::cli::{DistributionCommands, LibraryCommands, MailingListCommands};
use crate::commands::{progress, read_json_file};
use crate::connection::ConnectionManager;
use crate::error::{QualtricsCtlError, Result as CliResult};
use crate::output::{OutputFormat, print_output};

pub async fn handle_distribute(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    file: &Path,
    output_format: OutputFormat,
) -> CliResult<()> {
    let mut options: DistributionOptions = read_json_file(file)?;
    if options.reminder_send_date <= options.distribution_send_date {
        return Err(QualtricsCtlError::InvalidInput {
            message: "reminderSendDate must be after distributionSendDate".to_string(),
        });
    }

    let session = conn_mgr.create_session(profile_name, bearer_override).await?;
    if options.bearer_token.is_none() {
        options.bearer_token = session.bearer_token.clone();
    }

    let pb = progress::spinner(&format!(
        "Distributing survey {} to {} contacts",
        options.survey_id,
        options.contacts.len()
    ));
    let result = distribute_surveys(
        &session.client,
        &options,
        Some(progress::reporter("Import", &pb)),
    )
    .await;
    pb.finish_and_clear();
    let reminder_id = result?;
    info!(%reminder_id, "Distribution scheduled");

    print_output(
        json!({ "reminderDistributionId": reminder_id }),
        output_format,
    )?;
    Ok(())
}

pub async fn handle_mailing_list_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    cmd: &MailingListCommands,
    output_format: OutputFormat,
) -> CliResult<()> {
    let session = conn_mgr.create_session(profile_name, bearer_override).await?;

    match cmd {
        MailingListCommands::Create {
            directory_id,
            name,
            owner_id,
            prioritize_list_metadata,
        } => {
            let id = session
                .client
                .create_mailing_list(&CreateMailingListOptions {
                    directory_id: directory_id.clone(),
                    name: name.clone(),
                    owner_id: owner_id.clone(),
                    prioritize_list_metadata: *prioritize_list_metadata,
                    bearer_token: session.bearer_token.clone(),
                })
                .await?;
            print_output(json!({ "id": id }), output_format)?;
        }
    }
    Ok(())
}

pub async fn handle_distribution_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    cmd: &DistributionCommands,
    output_format: OutputFormat,
) -> CliResult<()> {
    let session = conn_mgr.create_session(profile_name, bearer_override).await?;

    match cmd {
        DistributionCommands::Get { id, survey_id } => {
            let distribution = session
                .client
                .get_distribution(id, survey_id, session.bearer())
                .await?;
            print_output(&distribution, output_format)?;
        }
        DistributionCommands::List {
            start,
            end,
            survey_id,
            mailing_list_id,
            request_type,
            skip_token,
            page_size,
        } => {
            let page = session
                .client
                .list_distributions(&ListDistributionsOptions {
                    send_start_date: *start,
                    send_end_date: *end,
                    survey_id: survey_id.clone(),
                    mailing_list_id: mailing_list_id.clone(),
                    distribution_request_type: *request_type,
                    skip_token: skip_token.clone(),
                    use_new_pagination_scheme: skip_token.is_some(),
                    page_size: *page_size,
                    bearer_token: session.bearer_token.clone(),
                })
                .await?;
            debug!(count = page.elements.len(), "Listed distributions");
            print_output(&page, output_format)?;
        }
    }
    Ok(())
}

pub async fn handle_library_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    cmd: &LibraryCommands,
    output_format: OutputFormat,
) -> CliResult<()> {
    let session = conn_mgr.create_session(profile_name, bearer_override).await?;

    match cmd {
        LibraryCommands::Messages {
            library_id,
            category,
            offset,
        } => {
            let page = session
                .client
                .list_library_messages(&ListLibraryMessagesOptions {
                    library_id: library_id.clone(),
                    category: category.clone(),
                    offset: *offset,
                    bearer_token: session.bearer_token.clone(),
                })
                .await?;
            print_output(&page, output_format)?;
        }
    }
    Ok(())
}
