use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use qualtrics_core::config::Config;
use tracing::{debug, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands, Shell};
use connection::ConnectionManager;
use error::QualtricsCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "qualtricsctl=warn,qualtrics_core=warn",
            1 => "qualtricsctl=info,qualtrics_core=info",
            2 => "qualtricsctl=debug,qualtrics_core=debug",
            _ => "qualtricsctl=trace,qualtrics_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), QualtricsCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let profile = cli.profile.as_deref();
    let bearer = cli.bearer_token.as_deref();
    let format = cli.output;

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            output::print_output(
                serde_json::json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }),
                format,
            )?;
            Ok(())
        }
        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, format).await
        }
        Commands::WhoAmI => commands::api::handle_whoami(conn_mgr, profile, bearer, format).await,
        Commands::Token => commands::api::handle_token(conn_mgr, profile, format).await,
        Commands::ExportResponses(args) => {
            commands::responses::handle_export(conn_mgr, profile, bearer, args).await
        }
        Commands::ImportContacts(args) => {
            commands::contacts::handle_import(conn_mgr, profile, bearer, args, format).await
        }
        Commands::Distribute { file } => {
            commands::distributions::handle_distribute(conn_mgr, profile, bearer, file, format)
                .await
        }
        Commands::MailingList(cmd) => {
            commands::distributions::handle_mailing_list_command(
                conn_mgr, profile, bearer, cmd, format,
            )
            .await
        }
        Commands::Distribution(cmd) => {
            commands::distributions::handle_distribution_command(
                conn_mgr, profile, bearer, cmd, format,
            )
            .await
        }
        Commands::Library(cmd) => {
            commands::distributions::handle_library_command(conn_mgr, profile, bearer, cmd, format)
                .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => debug!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Short command name for logs; never includes arguments, which may hold secrets
fn format_command(command: &Commands) -> &'static str {
    match command {
        Commands::WhoAmI => "whoami",
        Commands::Token => "token",
        Commands::ExportResponses(_) => "export-responses",
        Commands::ImportContacts(_) => "import-contacts",
        Commands::Distribute { .. } => "distribute",
        Commands::MailingList(_) => "mailing-list",
        Commands::Distribution(_) => "distribution",
        Commands::Library(_) => "library",
        Commands::Profile(_) => "profile",
        Commands::Completions { .. } => "completions",
        Commands::Version => "version",
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = std::io::stdout();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut stdout),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut stdout),
        Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut stdout),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, name, &mut stdout),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut stdout),
    }
}
