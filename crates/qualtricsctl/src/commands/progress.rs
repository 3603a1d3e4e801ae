//! Terminal spinner driven by polling progress events

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use qualtrics_core::{ProgressCallback, ProgressEvent};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Spinner on stderr for one polled operation
///
/// Ticks on its own between events. Hidden automatically when stderr is not
/// a terminal.
pub fn spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(label.to_string());
    pb.enable_steady_tick(TICK_INTERVAL);
    pb
}

/// Progress callback that updates `pb` on every event
pub fn reporter(label: &'static str, pb: &ProgressBar) -> ProgressCallback {
    let pb = pb.clone();
    Box::new(move |event: ProgressEvent| pb.set_message(describe(label, &event)))
}

fn describe(label: &str, event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Started { id } => format!("{} {} started", label, id),
        ProgressEvent::Polling {
            id,
            attempt,
            max_attempts,
            ..
        } => format!("{} {}: attempt {}/{}", label, id, attempt, max_attempts),
        ProgressEvent::Completed { id, attempts } => {
            format!("{} {} complete after {} checks", label, id, attempts)
        }
        ProgressEvent::Failed { id, error } => format!("{} {} failed: {}", label, id, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_polling() {
        let event = ProgressEvent::Polling {
            id: "ES_1".to_string(),
            attempt: 3,
            max_attempts: 60,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(describe("Export", &event), "Export ES_1: attempt 3/60");
    }

    #[test]
    fn test_spinner_ticks_until_finished() {
        let pb = spinner("Exporting responses for SV_1");
        assert_eq!(pb.message(), "Exporting responses for SV_1");

        std::thread::sleep(TICK_INTERVAL * 2);
        assert!(!pb.is_finished());

        pb.finish_and_clear();
        assert!(pb.is_finished());
    }

    #[test]
    fn test_reporter_updates_message() {
        let pb = ProgressBar::hidden();
        let callback = reporter("Import", &pb);
        callback(ProgressEvent::Completed {
            id: "imp_1".to_string(),
            attempts: 2,
        });
        assert_eq!(pb.message(), "Import imp_1 complete after 2 checks");
    }
}
