//! Connection options shared by every operation
//!
//! `ConnectionOptions` is built once and handed to a [`QualtricsClient`](crate::QualtricsClient).
//! It is never mutated afterwards, so a single client can serve any number of
//! concurrent calls.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default per-request timeout (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default polling interval for long-running operations (1 second)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default attempt cap for long-running operations
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Which route layout the remote API expects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// Routes live under `/API/v3`
    #[default]
    V3,
    /// Routes are used as-is, without a version prefix
    Bare,
}

impl ApiVersion {
    /// Prefix a resource path (without leading slash) for this layout
    #[must_use]
    pub fn route(self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match self {
            ApiVersion::V3 => format!("/API/v3/{path}"),
            ApiVersion::Bare => format!("/{path}"),
        }
    }
}

/// Bounded polling policy for long-running operations
///
/// The attempt cap is mandatory: a requested cap of zero is clamped to one,
/// so a poll loop always terminates within `interval * max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Upper bound on the time spent sleeping between probes
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}

/// Process-scoped configuration handed to every operation
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Datacenter id, e.g. `iad1` or `fra1`
    pub datacenter_id: String,
    /// API token sent as `X-API-TOKEN`; takes precedence over bearer tokens
    pub api_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Override for `https://{datacenter_id}.qualtrics.com`
    pub base_url: Option<String>,
    pub api_version: ApiVersion,
    pub poll_policy: PollPolicy,
}

impl ConnectionOptions {
    /// Options with defaults for everything but the datacenter
    pub fn new(datacenter_id: impl Into<String>) -> Self {
        Self {
            datacenter_id: datacenter_id.into(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
            api_version: ApiVersion::default(),
            poll_policy: PollPolicy::default(),
        }
    }

    #[must_use]
    pub fn builder(datacenter_id: impl Into<String>) -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder {
            options: Self::new(datacenter_id),
        }
    }

    /// Resolve the base URL requests are issued against
    pub fn resolve_base_url(&self) -> Result<Url> {
        let raw = match &self.base_url {
            Some(url) => url.clone(),
            None => {
                if self.datacenter_id.trim().is_empty() {
                    return Err(CoreError::Config("Datacenter id is required".to_string()));
                }
                format!("https://{}.qualtrics.com", self.datacenter_id)
            }
        };
        Url::parse(&raw).map_err(|e| CoreError::Config(format!("Invalid base URL '{raw}': {e}")))
    }

    /// Build a versioned route for a resource path
    #[must_use]
    pub fn route(&self, path: &str) -> String {
        self.api_version.route(path)
    }
}

/// Builder for [`ConnectionOptions`]
#[derive(Debug, Clone)]
pub struct ConnectionOptionsBuilder {
    options: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.options.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.options.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.options.api_version = version;
        self
    }

    #[must_use]
    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.options.poll_policy = policy;
        self
    }

    #[must_use]
    pub fn build(self) -> ConnectionOptions {
        self.options
    }
}
