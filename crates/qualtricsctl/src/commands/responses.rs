//! Response export command

use qualtrics_core::{ExportResponsesOptions, export_responses};
use tracing::info;

use crate::cli::ExportResponsesArgs;
use crate::commands::progress;
use crate::connection::ConnectionManager;
use crate::error::{QualtricsCtlError, Result as CliResult};
use crate::output::write_bytes;

pub async fn handle_export(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    bearer_override: Option<&str>,
    args: &ExportResponsesArgs,
) -> CliResult<()> {
    if args.end <= args.start {
        return Err(QualtricsCtlError::InvalidInput {
            message: "--end must be after --start".to_string(),
        });
    }

    let session = conn_mgr.create_session(profile_name, bearer_override).await?;

    let mut options = ExportResponsesOptions::new(&args.survey_id, args.start, args.end);
    options.format = args.format;
    options.compress = args.compress.then_some(true);
    options.use_labels = args.use_labels.then_some(true);
    options.limit = args.limit;
    options.bearer_token = session.bearer_token.clone();

    let pb = progress::spinner(&format!("Exporting responses for {}", args.survey_id));
    let result = export_responses(
        &session.client,
        &options,
        Some(progress::reporter("Export", &pb)),
    )
    .await;
    pb.finish_and_clear();

    let file = result?;
    info!(bytes = file.len(), format = %args.format, "Export downloaded");
    write_bytes(&file, args.out.as_deref())?;
    if let Some(path) = &args.out {
        eprintln!("Wrote {} bytes to {}", file.len(), path.display());
    }
    Ok(())
}
