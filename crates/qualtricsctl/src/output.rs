use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Render `data` in the requested format
pub fn render<T: Serialize>(data: T, format: OutputFormat) -> Result<String> {
    let json_value = serde_json::to_value(data)?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json_value)?),
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&json_value)?;
            Ok(yaml.trim_end().to_string())
        }
    }
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    println!("{}", render(data, format)?);
    Ok(())
}

/// Write raw bytes to `path`, or to stdout when no path is given
pub fn write_bytes(bytes: &[u8], path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json_is_pretty() {
        let out = render(json!({"userId": "UR_1"}), OutputFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"userId\": \"UR_1\"\n}");
    }

    #[test]
    fn test_render_yaml() {
        let out = render(json!({"id": "CG_1", "count": 2}), OutputFormat::Yaml).unwrap();
        assert!(out.contains("id: CG_1"));
        assert!(out.contains("count: 2"));
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn test_write_bytes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        write_bytes(b"id,q1\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"id,q1\n");
    }
}
