//! Bounded polling for long-running Qualtrics operations
//!
//! Imports and exports return an id that must be polled until the remote
//! side reports completion. [`poll`] drives that loop for any probe: it knows
//! nothing about HTTP or payload shapes, only about the probe future and the
//! predicate deciding whether its output is final.
//!
//! Each attempt lands in one of four states:
//!
//! - the predicate passes: the output is returned as-is
//! - the predicate fails and attempts remain: sleep `interval` and retry
//! - the predicate fails on the last attempt: [`CoreError::PollExhausted`]
//! - the probe itself fails: [`CoreError::ProbeFailed`], without retrying
//!
//! There is no external cancellation. The only bound is
//! `interval * max_attempts` plus the time spent in the probes.

use crate::error::{CoreError, Result};
use crate::options::PollPolicy;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Progress events emitted while polling
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Polling has begun for the operation `id`
    Started { id: String },
    /// One probe finished without satisfying the completion check
    Polling {
        id: String,
        attempt: u32,
        max_attempts: u32,
        elapsed: Duration,
    },
    /// The completion check passed
    Completed { id: String, attempts: u32 },
    /// Polling ended without completion
    Failed { id: String, error: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner; library callers usually pass `None`.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

enum PollState<T> {
    Polling,
    Succeeded(T),
    Exhausted,
    ProbeFailure(String),
}

/// Poll `probe` until `validate` accepts its output
///
/// # Arguments
///
/// * `id` - Identifier of the remote operation, used in logs and events
/// * `policy` - Interval between probes and the attempt cap
/// * `probe` - Produces one snapshot per call; an `Err` ends polling at once
/// * `validate` - Decides whether a snapshot is final
/// * `on_progress` - Optional callback for progress updates
///
/// # Example
///
/// ```rust,ignore
/// use qualtrics_core::{poll, PollPolicy};
///
/// let progress = poll(
///     &progress_id,
///     PollPolicy::default(),
///     || async { Ok::<_, std::convert::Infallible>(client.get_response_export_progress(&survey_id, &progress_id, None).await) },
///     |snapshot| matches!(snapshot, Ok(p) if p.is_complete()),
///     None,
/// )
/// .await??;
/// ```
pub async fn poll<T, E, F, Fut, V>(
    id: &str,
    policy: PollPolicy,
    mut probe: F,
    validate: V,
    on_progress: Option<ProgressCallback>,
) -> Result<T>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    V: Fn(&T) -> bool,
{
    let policy = PollPolicy::new(policy.interval, policy.max_attempts);
    let start = Instant::now();
    let mut attempts = 0u32;

    emit(&on_progress, ProgressEvent::Started { id: id.to_string() });

    loop {
        let outcome = probe().await;
        attempts += 1;

        let state = match outcome {
            Err(e) => PollState::ProbeFailure(e.to_string()),
            Ok(value) if validate(&value) => PollState::Succeeded(value),
            Ok(_) if attempts >= policy.max_attempts => PollState::Exhausted,
            Ok(_) => PollState::Polling,
        };

        match state {
            PollState::Polling => {
                let elapsed = start.elapsed();
                debug!(id, attempt = attempts, max_attempts = policy.max_attempts, ?elapsed, "Operation not complete yet");
                emit(
                    &on_progress,
                    ProgressEvent::Polling {
                        id: id.to_string(),
                        attempt: attempts,
                        max_attempts: policy.max_attempts,
                        elapsed,
                    },
                );
                tokio::time::sleep(policy.interval).await;
            }
            PollState::Succeeded(value) => {
                debug!(id, attempts, "Operation complete");
                emit(
                    &on_progress,
                    ProgressEvent::Completed {
                        id: id.to_string(),
                        attempts,
                    },
                );
                return Ok(value);
            }
            PollState::Exhausted => {
                let err = CoreError::PollExhausted { attempts };
                warn!(id, attempts, "Gave up polling");
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        id: id.to_string(),
                        error: err.to_string(),
                    },
                );
                return Err(err);
            }
            PollState::ProbeFailure(message) => {
                let err = CoreError::ProbeFailed(message);
                warn!(id, attempt = attempts, error = %err, "Poll probe failed");
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        id: id.to_string(),
                        error: err.to_string(),
                    },
                );
                return Err(err);
            }
        }
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
