//! Line classification helpers shared by the line map, the resolver and the
//! insertion planner.
//!
//! These work on raw text lines without parsing. Columns are 0-indexed
//! character offsets; indentation counts leading spaces and tabs.

/// Splits text into lines on `\n`, dropping a trailing `\r` from each.
///
/// Always yields at least one line, so line numbers line up with
/// `DocumentStats::line_count`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Number of leading whitespace characters.
pub fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Blank lines and full-line comments carry no structure.
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// True for a sequence entry line (`- x`, or a bare `-`).
pub fn is_dash_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed == "-" || trimmed.starts_with("- ") || trimmed.starts_with("-\t")
}

/// Columns of the leading run of dash markers: `"  - - a"` gives `[2, 4]`.
pub fn dash_columns(line: &str) -> Vec<usize> {
    let mut columns = Vec::new();
    let mut column = indent_of(line);
    let mut rest = &line[column..];

    while rest == "-" || rest.starts_with("- ") || rest.starts_with("-\t") {
        columns.push(column);
        let after = &rest[1..];
        let gap = indent_of(after);
        if gap == 0 {
            break;
        }
        column += 1 + gap;
        rest = &after[gap..];
    }

    columns
}

/// Column where the line's own content starts, past any dash markers.
pub fn content_column(line: &str) -> usize {
    match dash_columns(line).last() {
        Some(&dash) if dash + 1 < line.len() => dash + 1 + indent_of(&line[dash + 1..]),
        Some(&dash) => dash + 2,
        None => indent_of(line),
    }
}

/// The content of a line from `column` on, or `""` past the end.
pub fn content_from(line: &str, column: usize) -> &str {
    line.get(column..).unwrap_or("")
}

/// Returns true if `content` starts with the `key:` anchor.
///
/// The colon must be followed by whitespace or end the line so that `name`
/// does not match `names:` or `name:value`. Single- and double-quoted keys
/// are accepted too.
pub fn starts_with_key(content: &str, key: &str) -> bool {
    let candidates = [
        key.to_string(),
        format!("\"{}\"", key),
        format!("'{}'", key),
    ];

    candidates.iter().any(|candidate| {
        content
            .strip_prefix(candidate.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .map(|rest| rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t'))
            .unwrap_or(false)
    })
}

/// Returns true if the line, trimmed and with dash markers stripped, starts
/// with the `key:` anchor.
pub fn line_has_key(line: &str, key: &str) -> bool {
    starts_with_key(content_from(line, content_column(line)), key)
}

/// Extracts the key of a `key: ...` line, looking past dash markers.
///
/// Quotes around the key are removed.
pub fn key_of(line: &str) -> Option<&str> {
    let content = content_from(line, content_column(line)).trim_end();
    if content.is_empty() || content.starts_with('#') {
        return None;
    }

    let colon = find_key_colon(content)?;
    let key = content[..colon].trim();
    let key = strip_quotes(key);
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Byte offset of the colon ending a key: the first `:` followed by
/// whitespace or end of line, outside quotes.
fn find_key_colon(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if (b == b'"' || b == b'\'') && i == 0 => quote = Some(b),
            None if b == b':' => {
                let next = bytes.get(i + 1);
                if next.is_none() || next == Some(&b' ') || next == Some(&b'\t') {
                    return Some(i);
                }
            }
            None => {}
        }
    }

    None
}

/// The value written after `key:` on the same line, with any trailing
/// comment removed. `None` if nothing follows the colon.
pub fn inline_value(line: &str) -> Option<&str> {
    let content = content_from(line, content_column(line));
    let colon = find_key_colon(content)?;
    let value = strip_comment(content[colon + 1..].trim());
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// True if a key line opens a nested block: nothing after the colon except
/// an anchor or a tag.
pub fn opens_block(line: &str) -> bool {
    match inline_value(line) {
        None => true,
        Some(value) => value
            .split_whitespace()
            .all(|token| token.starts_with('&') || token.starts_with('!')),
    }
}

/// The text of a `- item` line after its dash, trimmed.
pub fn dash_item_text(line: &str) -> Option<&str> {
    if !is_dash_item(line) {
        return None;
    }
    Some(strip_comment(line.trim_start()[1..].trim()))
}

/// Removes one pair of matching surrounding quotes.
pub fn strip_quotes(text: &str) -> &str {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Drops a trailing ` # comment` outside of quotes.
fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') || value.starts_with('\'') {
        return value;
    }
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None if value.starts_with('#') => "",
        None => value,
    }
}
