//! CLI structure and command definitions
//!
//! Two layers of commands:
//! 1. Primitive API calls (`whoami`, `mailing-list`, `distribution`, `library`)
//! 2. Long-running workflows that poll until done (`export-responses`,
//!    `import-contacts`, `distribute`)

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use qualtrics_core::{ApiVersion, DistributionRequestType, ExportFormat};

pub use crate::output::OutputFormat;

/// Command-line client for the Qualtrics REST API
#[derive(Parser, Debug)]
#[command(name = "qualtricsctl")]
#[command(version, about = "Command-line client for the Qualtrics REST API")]
#[command(long_about = "
Command-line client for the Qualtrics REST API

EXAMPLES:
    # Set up a profile
    qualtricsctl profile set prod --datacenter-id iad1 --api-token TOKEN

    # Check which user the credentials belong to
    qualtricsctl whoami

    # Export a month of responses to a file
    qualtricsctl export-responses --survey-id SV_123 \\
        --start 2024-01-01 --end 2024-02-01 --out responses.csv

    # Import contacts into a mailing list
    qualtricsctl import-contacts --directory-id POOL_1 --mailing-list-id CG_1 contacts.json

    # YAML output for any command
    qualtricsctl distribution list --start 2024-05-01 --end 2024-06-01 -o yaml

For more help on a specific command, run:
    qualtricsctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "QUALTRICS_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "QUALTRICS_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// OAuth bearer token, used instead of the profile's API token
    #[arg(
        long,
        global = true,
        env = "QUALTRICS_BEARER_TOKEN",
        hide_env_values = true
    )]
    pub bearer_token: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the user behind the configured credentials
    #[command(name = "whoami")]
    WhoAmI,

    /// Exchange the profile's OAuth client for a bearer token
    Token,

    /// Export survey responses and download the file
    #[command(visible_alias = "export")]
    #[command(after_help = "EXAMPLES:
    # CSV export to stdout
    qualtricsctl export-responses --survey-id SV_123 --start 2024-01-01 --end 2024-02-01

    # Zipped SPSS export to a file
    qualtricsctl export-responses --survey-id SV_123 --start 2024-01-01T00:00:00Z \\
        --end 2024-01-31T23:59:59Z --format spss --compress --out responses.zip
")]
    ExportResponses(ExportResponsesArgs),

    /// Import contacts from a JSON file into a mailing list
    #[command(visible_alias = "import")]
    ImportContacts(ImportContactsArgs),

    /// Create a mailing list, import contacts, send a survey and schedule a reminder
    #[command(after_help = "The FILE holds the distribution options as JSON, e.g.:

    {
      \"directoryId\": \"POOL_1\",
      \"mailingListName\": \"Spring wave\",
      \"ownerId\": \"UR_1\",
      \"contacts\": [{\"email\": \"ana@example.com\"}],
      \"libraryId\": \"UR_1\",
      \"distributionMessageId\": \"MS_1\",
      \"reminderMessageId\": \"MS_2\",
      \"fromEmail\": \"noreply@example.com\",
      \"fromName\": \"Research\",
      \"distributionSubject\": \"Tell us\",
      \"reminderSubject\": \"Reminder: tell us\",
      \"surveyId\": \"SV_1\",
      \"distributionSendDate\": \"2024-05-02T09:00:00Z\",
      \"reminderSendDate\": \"2024-05-09T09:00:00Z\"
    }
")]
    Distribute {
        /// JSON file with the distribution options
        file: PathBuf,
    },

    /// Mailing list operations
    #[command(subcommand, name = "mailing-list", visible_alias = "ml")]
    MailingList(MailingListCommands),

    /// Distribution operations
    #[command(subcommand, visible_alias = "dist")]
    Distribution(DistributionCommands),

    /// Message library operations
    #[command(subcommand, visible_alias = "lib")]
    Library(LibraryCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    Profile(ProfileCommands),

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    #[command(visible_alias = "ver")]
    Version,
}

#[derive(Args, Debug)]
pub struct ExportResponsesArgs {
    /// Survey to export
    #[arg(long)]
    pub survey_id: String,

    /// Start of the response window (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_datetime)]
    pub start: DateTime<Utc>,

    /// End of the response window (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_datetime)]
    pub end: DateTime<Utc>,

    /// Export file format
    #[arg(long, value_parser = parse_export_format, default_value = "csv")]
    pub format: ExportFormat,

    /// Ask for a zipped file
    #[arg(long)]
    pub compress: bool,

    /// Export choice labels instead of recode values
    #[arg(long)]
    pub use_labels: bool,

    /// Maximum number of responses
    #[arg(long)]
    pub limit: Option<u64>,

    /// Write the file here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportContactsArgs {
    /// Directory (pool) id
    #[arg(long)]
    pub directory_id: String,

    /// Mailing list to import into
    #[arg(long)]
    pub mailing_list_id: String,

    /// Batch id recorded on every imported transaction
    #[arg(long)]
    pub batch_id: Option<String>,

    /// JSON file holding an array of contacts
    pub file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum MailingListCommands {
    /// Create a mailing list in a directory
    Create {
        #[arg(long)]
        directory_id: String,

        /// Mailing list name
        #[arg(long)]
        name: String,

        /// Owner user id
        #[arg(long)]
        owner_id: String,

        /// Let list-level embedded data win over contact-level data
        #[arg(long)]
        prioritize_list_metadata: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DistributionCommands {
    /// Get one distribution with its stats
    Get {
        /// Distribution id
        id: String,

        #[arg(long)]
        survey_id: String,
    },

    /// List distributions sent within a date window
    #[command(visible_alias = "ls")]
    List {
        #[arg(long, value_parser = parse_datetime)]
        start: DateTime<Utc>,

        #[arg(long, value_parser = parse_datetime)]
        end: DateTime<Utc>,

        #[arg(long)]
        survey_id: Option<String>,

        #[arg(long)]
        mailing_list_id: Option<String>,

        /// Filter by request type (invite, reminder, thank-you, generated-invite)
        #[arg(long, value_parser = parse_request_type)]
        request_type: Option<DistributionRequestType>,

        /// Token for the next page, from a previous listing
        #[arg(long)]
        skip_token: Option<String>,

        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// List saved messages in a library
    Messages {
        /// Library id (a user or group id)
        library_id: String,

        /// Message category, e.g. invite or reminder
        #[arg(long)]
        category: Option<String>,

        /// Number of messages to skip
        #[arg(long)]
        offset: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    #[command(after_help = "EXAMPLES:
    # API token profile
    qualtricsctl profile set prod --datacenter-id iad1 --api-token TOKEN

    # OAuth client profile (secret will be prompted)
    qualtricsctl profile set oauth --datacenter-id fra1 --client-id CLIENT

    # Store the token in the OS keyring
    qualtricsctl profile set prod --datacenter-id iad1 --api-token TOKEN --use-keyring
")]
    Set {
        /// Profile name
        name: String,

        /// Datacenter id, e.g. iad1
        #[arg(long)]
        datacenter_id: String,

        /// API token
        #[arg(long)]
        api_token: Option<String>,

        /// OAuth client id
        #[arg(long)]
        client_id: Option<String>,

        /// OAuth client secret (prompted when --client-id is given without it)
        #[arg(long, requires = "client_id")]
        client_secret: Option<String>,

        /// OAuth scope
        #[arg(long, requires = "client_id")]
        scope: Option<String>,

        /// Override the datacenter URL
        #[arg(long)]
        base_url: Option<String>,

        /// Route prefix style: v3 or bare
        #[arg(long, value_parser = parse_api_version)]
        api_version: Option<ApiVersion>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Store secrets in the OS keyring
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Set the default profile
    Default {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Accepts RFC 3339 timestamps or plain dates (midnight UTC)
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date: {} (expected RFC 3339 or YYYY-MM-DD)", s))
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    match s.to_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "tsv" => Ok(ExportFormat::Tsv),
        "spss" => Ok(ExportFormat::Spss),
        "json" => Ok(ExportFormat::Json),
        "ndjson" => Ok(ExportFormat::Ndjson),
        "xml" => Ok(ExportFormat::Xml),
        _ => Err(format!(
            "invalid export format: {} (valid: csv, tsv, spss, json, ndjson, xml)",
            s
        )),
    }
}

fn parse_request_type(s: &str) -> Result<DistributionRequestType, String> {
    match s.to_lowercase().as_str() {
        "invite" => Ok(DistributionRequestType::Invite),
        "reminder" => Ok(DistributionRequestType::Reminder),
        "thank-you" | "thankyou" => Ok(DistributionRequestType::ThankYou),
        "generated-invite" | "generatedinvite" => Ok(DistributionRequestType::GeneratedInvite),
        _ => Err(format!(
            "invalid request type: {} (valid: invite, reminder, thank-you, generated-invite)",
            s
        )),
    }
}

fn parse_api_version(s: &str) -> Result<ApiVersion, String> {
    match s.to_lowercase().as_str() {
        "v3" => Ok(ApiVersion::V3),
        "bare" => Ok(ApiVersion::Bare),
        _ => Err(format!("invalid API version: {} (valid: v3, bare)", s)),
    }
}
