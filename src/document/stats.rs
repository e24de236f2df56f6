//! Size and line metadata for document text.

/// Line count and byte size of the last successfully parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub line_count: usize,
    pub byte_size: usize,
}

impl DocumentStats {
    /// Measures `text`. An empty document still counts as one line.
    pub fn measure(text: &str) -> Self {
        Self {
            line_count: text.split('\n').count(),
            byte_size: text.len(),
        }
    }

    /// Human-readable size, e.g. `512 B`, `1.5 KB`, `2.0 MB`.
    pub fn size_label(&self) -> String {
        format_size(self.byte_size)
    }
}

/// Formats a byte count with one decimal place above 1024 bytes.
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / MB)
    }
}
