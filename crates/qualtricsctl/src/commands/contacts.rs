//! Contact import command

use qualtrics_core::{Contact, StartContactsImport, TransactionMeta, import_contacts};
use tracing::info;

use crate::cli::ImportContactsArgs;
use crate::commands::{progress, read_json_file};
use crate::connection::ConnectionManager;
use crate::error::{QualtricsCtlError, Result as CliResult};
use crate::output::{OutputFormat, print_output};

pub async fn handle_import(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    args: &ImportContactsArgs,
    output_format: OutputFormat,
) -> CliResult<()> {
    let contacts: Vec<Contact> = read_json_file(&args.file)?;
    if contacts.is_empty() {
        return Err(QualtricsCtlError::InvalidInput {
            message: format!("{} contains no contacts", args.file.display()),
        });
    }
    info!(count = contacts.len(), "Loaded contacts");

    let session = conn_mgr.create_session(profile_name, bearer_override).await?;
    let request = StartContactsImport {
        directory_id: args.directory_id.clone(),
        mailing_list_id: args.mailing_list_id.clone(),
        contacts,
        transaction_meta: TransactionMeta {
            batch_id: args.batch_id.clone(),
            ..TransactionMeta::default()
        },
        bearer_token: session.bearer_token.clone(),
    };

    let pb = progress::spinner(&format!("Importing {} contacts", request.contacts.len()));
    let result = import_contacts(
        &session.client,
        &request,
        Some(progress::reporter("Import", &pb)),
    )
    .await;
    pb.finish_and_clear();

    print_output(&result?, output_format)?;
    Ok(())
}
