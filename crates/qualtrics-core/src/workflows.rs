//! Multi-step workflows
//!
//! Each workflow chains primitive operations and stops at the first failure,
//! returning that failure unchanged. Long-running steps go through
//! [`poll`](crate::progress::poll) with the client's [`PollPolicy`](crate::PollPolicy).

use crate::client::QualtricsClient;
use crate::error::{Result, ValidationError};
use crate::operations::{
    Contact, ContactsImportRef, ContactsImportSummary, CreateDistributionOptions,
    CreateMailingListOptions, CreateReminderOptions, EmailHeader, ExportResponsesOptions,
    StartContactsImport, SurveyLinkType, TransactionMeta,
};
use crate::progress::{ProgressCallback, poll};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use tracing::{info, warn};

/// Import contacts into a mailing list and wait for the final summary
///
/// Status probes that come back as `Err` are logged and retried like an
/// unfinished import; only the attempt cap ends polling early.
pub async fn import_contacts(
    client: &QualtricsClient,
    request: &StartContactsImport,
    on_progress: Option<ProgressCallback>,
) -> Result<ContactsImportSummary> {
    // Step 1: Start the import
    let started = client.start_contacts_import(request).await?;
    info!(import_id = %started.id, contacts = request.contacts.len(), "Contacts import started");

    let import = ContactsImportRef {
        directory_id: &request.directory_id,
        mailing_list_id: &request.mailing_list_id,
        import_id: &started.id,
        bearer_token: request.bearer_token.as_deref(),
    };

    // Step 2: Poll until the import reports 100%
    let import_ref = &import;
    poll(
        &started.id,
        client.options().poll_policy,
        move || async move {
            let status = client.get_contacts_import_status(import_ref).await;
            if let Err(e) = &status {
                warn!(import_id = import_ref.import_id, error = %e, "Import status check failed");
            }
            Ok::<_, Infallible>(status)
        },
        |status| matches!(status, Ok(s) if s.is_complete()),
        on_progress,
    )
    .await??;

    // Step 3: Fetch the summary
    client.get_contacts_import_summary(&import).await
}

/// Export survey responses and download the resulting file
pub async fn export_responses(
    client: &QualtricsClient,
    options: &ExportResponsesOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Vec<u8>> {
    let bearer_token = options.bearer_token.as_deref();

    // Step 1: Start the export
    let started = client.start_response_export(options).await?;
    info!(survey_id = %options.survey_id, progress_id = %started.progress_id, "Response export started");

    // Step 2: Poll until a file is ready
    let survey_id = options.survey_id.as_str();
    let progress_id = started.progress_id.as_str();
    let progress = poll(
        progress_id,
        client.options().poll_policy,
        move || async move {
            let progress = client
                .get_response_export_progress(survey_id, progress_id, bearer_token)
                .await;
            if let Err(e) = &progress {
                warn!(progress_id, error = %e, "Export progress check failed");
            }
            Ok::<_, Infallible>(progress)
        },
        |progress| matches!(progress, Ok(p) if p.is_complete()),
        on_progress,
    )
    .await??;

    let file_id = progress.file_id.ok_or(ValidationError::InvalidShape {
        context: "File Progress Response",
        reason: "missing field `fileId` on a completed export".to_string(),
    })?;

    // Step 3: Download the file
    let file = client
        .get_response_export_file(&options.survey_id, &file_id, bearer_token)
        .await?;
    info!(file_id = %file_id, bytes = file.len(), "Response export downloaded");
    Ok(file)
}

/// Everything needed to send a survey to a fresh mailing list with a reminder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionOptions {
    pub directory_id: String,
    pub mailing_list_name: String,
    pub owner_id: String,
    #[serde(default)]
    pub prioritize_list_metadata: bool,
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub transaction_meta: TransactionMeta,
    pub library_id: String,
    pub distribution_message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_message_text: Option<String>,
    pub reminder_message_id: String,
    pub from_email: String,
    pub from_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_email: Option<String>,
    pub distribution_subject: String,
    pub reminder_subject: String,
    pub survey_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link_type: SurveyLinkType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub embedded_data: Map<String, Value>,
    pub distribution_send_date: DateTime<Utc>,
    pub reminder_send_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl DistributionOptions {
    fn header(&self, subject: &str) -> EmailHeader {
        EmailHeader {
            from_email: self.from_email.clone(),
            reply_to_email: self.reply_to_email.clone(),
            from_name: self.from_name.clone(),
            subject: subject.to_string(),
        }
    }
}

/// Create a mailing list, import contacts into it, distribute a survey to
/// it and schedule a reminder.
///
/// Returns the reminder's distribution id. `on_progress` follows the
/// contact import poll.
pub async fn distribute_surveys(
    client: &QualtricsClient,
    options: &DistributionOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<String> {
    // Step 1: Create the mailing list
    let mailing_list_id = client
        .create_mailing_list(&CreateMailingListOptions {
            directory_id: options.directory_id.clone(),
            name: options.mailing_list_name.clone(),
            owner_id: options.owner_id.clone(),
            prioritize_list_metadata: options.prioritize_list_metadata,
            bearer_token: options.bearer_token.clone(),
        })
        .await?;
    info!(%mailing_list_id, "Mailing list created");

    // Step 2: Import contacts and wait for the import to finish
    let summary = import_contacts(
        client,
        &StartContactsImport {
            directory_id: options.directory_id.clone(),
            mailing_list_id: mailing_list_id.clone(),
            contacts: options.contacts.clone(),
            transaction_meta: options.transaction_meta.clone(),
            bearer_token: options.bearer_token.clone(),
        },
        on_progress,
    )
    .await?;
    info!(
        added = summary.contacts.count.added,
        failed = summary.contacts.count.failed,
        "Contacts imported"
    );

    // Step 3: Create the distribution
    let distribution_id = client
        .create_distribution(&CreateDistributionOptions {
            library_id: options.library_id.clone(),
            message_id: options.distribution_message_id.clone(),
            message_text: options.distribution_message_text.clone(),
            mailing_list_id,
            contact_id: None,
            transaction_batch_id: options.transaction_meta.batch_id.clone(),
            header: options.header(&options.distribution_subject),
            survey_id: options.survey_id.clone(),
            expiration_date: options.expiration_date,
            link_type: options.link_type,
            embedded_data: options.embedded_data.clone(),
            send_date: options.distribution_send_date,
            bearer_token: options.bearer_token.clone(),
        })
        .await?;
    info!(%distribution_id, "Distribution created");

    // Step 4: Schedule the reminder
    let reminder_id = client
        .create_reminder(&CreateReminderOptions {
            distribution_id,
            library_id: options.library_id.clone(),
            message_id: options.reminder_message_id.clone(),
            header: options.header(&options.reminder_subject),
            embedded_data: options.embedded_data.clone(),
            send_date: options.reminder_send_date,
            bearer_token: options.bearer_token.clone(),
        })
        .await?;
    info!(%reminder_id, "Reminder created");

    Ok(reminder_id)
}
