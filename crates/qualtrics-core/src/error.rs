//! Unified error handling for qualtrics-core
//!
//! Every operation in the crate returns [`Result`]: `Ok` carries the typed
//! payload, `Err` carries a [`CoreError`] whose `Display` is the
//! human-readable failure message. Nothing is thrown past an operation
//! boundary, so multi-step workflows compose with `?` and stop at the first
//! failure.
//!
//! # Example
//!
//! ```rust
//! use qualtrics_core::{CoreError, failure, success};
//!
//! let ok = success(42);
//! assert_eq!(ok.unwrap(), 42);
//!
//! let err: qualtrics_core::Result<u32> = failure("Incorrect token format");
//! let err = err.unwrap_err();
//! assert_eq!(err.message(), "Incorrect token format");
//! assert!(matches!(err, CoreError::Failure(_)));
//! ```

use thiserror::Error;

/// Core error type for every Qualtrics operation
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or unusable configuration (no credential, bad base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx response from the Qualtrics API
    #[error("{}", render_api(*status, code.as_deref(), message))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Network failure or request timeout
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx response whose body did not have the expected shape
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The poll budget ran out before the completion check passed
    #[error("Exceeded max attempts")]
    PollExhausted { attempts: u32 },

    /// The polled probe itself failed; never retried
    #[error("Poll function execution failed: {0}")]
    ProbeFailed(String),

    /// Free-form failure built with [`failure`]
    #[error("{0}")]
    Failure(String),
}

/// Why a response body could not be narrowed into its typed form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body had no `result` envelope
    #[error("Unable to parse {context}")]
    MissingResult { context: &'static str },

    /// The `result` envelope is missing a field or has a field of the wrong type
    #[error("{context} invalid format: {reason}")]
    InvalidShape {
        context: &'static str,
        reason: String,
    },

    /// A 2xx body that carried an `error` object instead of a `result`
    #[error("{code}: {message}")]
    Remote { code: String, message: String },

    /// The transport returned text or bytes where JSON was expected
    #[error("Unexpected {found} body in {context}")]
    UnexpectedBody {
        context: &'static str,
        found: &'static str,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Wrap a successful payload.
pub fn success<T>(data: T) -> Result<T> {
    Ok(data)
}

/// Build a failure carrying `message` verbatim.
pub fn failure<T>(message: impl Into<String>) -> Result<T> {
    Err(CoreError::Failure(message.into()))
}

fn render_api(status: u16, code: Option<&str>, message: &str) -> String {
    match code {
        Some(code) => format!("{status}: {code}: {message}"),
        None => format!("{status}: {message}"),
    }
}

impl CoreError {
    /// Human-readable message carried by this failure
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code, when the failure came from an API response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Api { status, .. } => Some(*status),
            CoreError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if this is a configuration error raised before any I/O
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, CoreError::Config(_))
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if this is a timeout, either of one request or of a poll budget
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Request(e) => e.is_timeout(),
            CoreError::PollExhausted { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Request(e) => e.is_timeout() || e.is_connect(),
            CoreError::PollExhausted { .. } => true,
            _ => self.is_rate_limited() || self.is_server_error(),
        }
    }
}
