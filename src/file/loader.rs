//! Document text loading.
//!
//! The text is the source of truth, so loading returns it unparsed; callers
//! hand it to `SyncEngine::validate`. Gzipped input is decompressed
//! transparently, by `.gz` extension for files and by magic bytes for stdin.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads a document from the filesystem.
///
/// # Examples
///
/// ```no_run
/// use yamlsync::file::loader::load_text;
///
/// let text = load_text("company.yaml").unwrap();
/// println!("{} bytes", text.len());
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, a `.gz` file does not
/// decompress, or the content is not UTF-8.
pub fn load_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    let is_gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "gz");

    if is_gzipped {
        read_gzipped_file(path)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Reads a document from stdin, decompressing it if it is gzipped.
pub fn load_from_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    decode_bytes(buffer)
}

/// Loads from `source`, where `-` means stdin.
pub fn load_source(source: &str) -> Result<String> {
    if source == "-" {
        load_from_stdin()
    } else {
        load_text(source)
    }
}

fn decode_bytes(buffer: Vec<u8>) -> Result<String> {
    if buffer.starts_with(&GZIP_MAGIC) {
        decompress_gzip_bytes(&buffer)
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in input")
    }
}

fn read_gzipped_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open gzipped file {}", path.display()))?;
    decompress(file).context("Failed to decompress gzipped file - file may be corrupted")
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    decompress(bytes).context("Failed to decompress gzipped input")
}

fn decompress<R: std::io::Read>(reader: R) -> std::io::Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(reader);
    let mut content = String::new();
    decoder.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_load_plain_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        fs::write(&path, "a: 1\n").unwrap();
        assert_eq!(load_text(&path).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_load_gzipped_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml.gz");
        fs::write(&path, gzip("team:\n  lead: Alice\n")).unwrap();
        assert_eq!(load_text(&path).unwrap(), "team:\n  lead: Alice\n");
    }

    #[test]
    fn test_corrupted_gzip_reports_context() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml.gz");
        fs::write(&path, b"not gzip data").unwrap();
        let err = load_text(&path).unwrap_err().to_string();
        assert!(err.contains("decompress"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_text(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_decode_bytes_sniffs_gzip() {
        assert_eq!(decode_bytes(gzip("x: 1\n")).unwrap(), "x: 1\n");
        assert_eq!(decode_bytes(b"y: 2\n".to_vec()).unwrap(), "y: 2\n");
        assert!(decode_bytes(vec![0xff, 0xfe]).is_err());
    }
}
