//! # qualtrics-core
//!
//! Typed client for the Qualtrics REST API.
//!
//! Every operation returns [`Result`]: either the typed payload or a
//! [`CoreError`] describing what went wrong, from a missing credential to a
//! malformed response. Nothing panics or escapes past an operation boundary.
//!
//! ## Layers
//!
//! - **Transport** ([`Transport`], [`ReqwestTransport`]) - one HTTP request in,
//!   one parsed body or structured error out
//! - **Primitive operations** (methods on [`QualtricsClient`]) - one call per
//!   endpoint, each validating its response into a typed value
//! - **Polling** ([`poll`]) - bounded retry of a probe until a predicate holds
//! - **Workflows** ([`import_contacts`], [`export_responses`],
//!   [`distribute_surveys`]) - multi-step operations that stop at the first
//!   failure
//! - **Config** ([`config`]) - TOML profiles for tools built on the client
//!
//! ## Example
//!
//! ```rust,no_run
//! use qualtrics_core::{ConnectionOptions, ExportResponsesOptions, QualtricsClient, export_responses};
//! use chrono::{Duration, Utc};
//!
//! # async fn run() -> qualtrics_core::Result<()> {
//! let options = ConnectionOptions::builder("iad1").api_token("my-token").build();
//! let client = QualtricsClient::new(options)?;
//!
//! let who = client.test_connection(None).await?;
//! println!("Connected as {}", who.user_id);
//!
//! let end = Utc::now();
//! let request = ExportResponsesOptions::new("SV_123", end - Duration::days(7), end);
//! let csv = export_responses(&client, &request, None).await?;
//! println!("{} bytes", csv.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod operations;
pub mod options;
pub mod progress;
pub mod transport;
pub mod validate;
pub mod workflows;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::QualtricsClient;
pub use error::{CoreError, Result, ValidationError, failure, success};
pub use operations::*;
pub use options::{
    ApiVersion, ConnectionOptions, ConnectionOptionsBuilder, DEFAULT_INTERVAL,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT, PollPolicy,
};
pub use progress::{ProgressCallback, ProgressEvent, poll};
pub use transport::{ApiRequest, RequestBody, ReqwestTransport, ResponseBody, Transport};
pub use workflows::{DistributionOptions, distribute_surveys, export_responses, import_contacts};
