//! Document text saving.
//!
//! Writes go to a temporary sibling first and are then renamed over the
//! target, so the target is never left partially written. Targets ending in
//! `.gz` are gzip-compressed.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Saves `text` to `path` atomically.
///
/// Refuses text that does not parse, so a broken buffer never replaces a
/// good file.
///
/// # Examples
///
/// ```no_run
/// use yamlsync::file::saver::save_text;
///
/// save_text("company.yaml", "company:\n  name: Acme\n").unwrap();
/// ```
pub fn save_text<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();

    crate::document::parser::parse_document(text)
        .with_context(|| format!("Refusing to save invalid YAML to {}", path.display()))?;

    let compress = path.to_string_lossy().ends_with(".gz");
    write_file_atomic(path, text.as_bytes(), compress)
}

fn write_file_atomic(path: &Path, data: &[u8], compress: bool) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let temp_path = path.with_extension("tmp");

    if compress {
        let file = fs::File::create(&temp_path).context("Failed to create temp file")?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(data)
            .context("Failed to write compressed data")?;
        encoder.finish().context("Failed to finish compression")?;
    } else {
        fs::write(&temp_path, data).context("Failed to write temp file")?;
    }

    fs::rename(&temp_path, path).context("Failed to rename temp file")?;
    tracing::debug!(path = %path.display(), bytes = data.len(), compress, "saved document");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::loader::load_text;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        save_text(&path, "a: 1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 1\n");
        assert!(!dir.path().join("doc.tmp").exists());
    }

    #[test]
    fn test_save_gzipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml.gz");
        save_text(&path, "b: two\n").unwrap();
        assert_ne!(fs::read(&path).unwrap(), b"b: two\n");
        assert_eq!(load_text(&path).unwrap(), "b: two\n");
    }

    #[test]
    fn test_invalid_text_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        fs::write(&path, "a: 1\n").unwrap();

        assert!(save_text(&path, "a: [1\n").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 1\n");
    }
}
