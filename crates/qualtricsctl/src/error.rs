//! Error types for qualtricsctl
//!
//! Structured errors with thiserror, printed as cargo-style diagnostics.

use colored::Colorize;
use qualtrics_core::CoreError;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: qualtricsctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<String>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for tip in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Main error type for the qualtricsctl application
#[derive(Error, Debug)]
pub enum QualtricsCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'qualtricsctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Missing credentials for profile '{name}'")]
    MissingCredentials { name: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

pub type Result<T> = std::result::Result<T, QualtricsCtlError>;

impl QualtricsCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            QualtricsCtlError::ProfileNotFound { name } => vec![
                "List available profiles: qualtricsctl profile list".to_string(),
                format!(
                    "Create profile '{}': qualtricsctl profile set {} --datacenter-id <id>",
                    name, name
                ),
            ],
            QualtricsCtlError::NoProfileConfigured => vec![
                "Create a profile: qualtricsctl profile set prod --datacenter-id iad1 --api-token <token>".to_string(),
                "Or set QUALTRICS_DATACENTER_ID and QUALTRICS_API_TOKEN".to_string(),
            ],
            QualtricsCtlError::MissingCredentials { name } => vec![
                format!("Add an API token: qualtricsctl profile set {} --api-token <token>", name),
                format!("Check profile details: qualtricsctl profile show {}", name),
            ],
            QualtricsCtlError::AuthenticationFailed { .. } => vec![
                "Check your credentials: qualtricsctl profile show <profile>".to_string(),
                "Verify the datacenter id matches your account".to_string(),
            ],
            QualtricsCtlError::ConnectionError { .. } | QualtricsCtlError::Timeout { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the datacenter id: qualtricsctl profile show <profile>".to_string(),
            ],
            QualtricsCtlError::ApiError { message } if message.starts_with("404") => vec![
                "Verify the resource ID is correct".to_string(),
                "Check that you're using the correct profile".to_string(),
            ],
            QualtricsCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: qualtricsctl <command> --help".to_string(),
            ],
            QualtricsCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify the file contains valid JSON".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());
        if let QualtricsCtlError::MissingCredentials { .. } = self {
            diag = diag.detail("Neither an API token nor an OAuth client is configured.");
        }
        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }
        diag.print();
    }
}

impl From<CoreError> for QualtricsCtlError {
    fn from(err: CoreError) -> Self {
        if err.is_unauthorized() {
            return QualtricsCtlError::AuthenticationFailed {
                message: err.to_string(),
            };
        }
        if err.is_timeout() {
            return QualtricsCtlError::Timeout {
                message: err.to_string(),
            };
        }
        match err {
            CoreError::Config(message) => QualtricsCtlError::Configuration(message),
            CoreError::Request(e) => QualtricsCtlError::ConnectionError {
                message: e.to_string(),
            },
            other => QualtricsCtlError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<qualtrics_core::config::ConfigError> for QualtricsCtlError {
    fn from(err: qualtrics_core::config::ConfigError) -> Self {
        use qualtrics_core::config::ConfigError;
        match err {
            ConfigError::ProfileNotFound { name } => QualtricsCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles => QualtricsCtlError::NoProfileConfigured,
            other => QualtricsCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for QualtricsCtlError {
    fn from(err: serde_json::Error) -> Self {
        QualtricsCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for QualtricsCtlError {
    fn from(err: std::io::Error) -> Self {
        QualtricsCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for QualtricsCtlError {
    fn from(err: anyhow::Error) -> Self {
        QualtricsCtlError::Configuration(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_authentication_failed() {
        let err = QualtricsCtlError::from(CoreError::Api {
            status: 401,
            code: None,
            message: "Invalid API token".to_string(),
        });
        assert!(matches!(err, QualtricsCtlError::AuthenticationFailed { .. }));
    }

    #[test]
    fn test_missing_profile_keeps_name() {
        let err = QualtricsCtlError::from(qualtrics_core::config::ConfigError::ProfileNotFound {
            name: "prod".to_string(),
        });
        assert_eq!(err.to_string(), "Profile 'prod' not found");
        assert!(err.suggestions()[0].contains("profile list"));
    }

    #[test]
    fn test_not_found_suggests_checking_id() {
        let err = QualtricsCtlError::ApiError {
            message: "404: Not Found".to_string(),
        };
        assert_eq!(err.suggestions().len(), 2);
    }
}
