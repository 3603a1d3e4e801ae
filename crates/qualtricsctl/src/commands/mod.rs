pub mod api;
pub mod contacts;
pub mod distributions;
pub mod profile;
pub mod progress;
pub mod responses;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{QualtricsCtlError, Result as CliResult};

/// Read and parse a JSON input file
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let file_error = |message: String| QualtricsCtlError::FileError {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| file_error(format!("Invalid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qualtrics_core::Contact;

    #[test]
    fn test_read_json_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "[{\"email\": ").unwrap();

        let err = read_json_file::<Vec<Contact>>(&path).unwrap_err();
        match err {
            QualtricsCtlError::FileError { path: p, message } => {
                assert!(p.ends_with("contacts.json"));
                assert!(message.starts_with("Invalid JSON"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_json_file_missing() {
        let err = read_json_file::<Vec<Contact>>(Path::new("/nonexistent/contacts.json"))
            .unwrap_err();
        assert!(matches!(err, QualtricsCtlError::FileError { .. }));
    }
}
