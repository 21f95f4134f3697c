//! Loading Documenter `search_index.js` files.
//!
//! Documenter writes the index as a script, `var documenterSearchIndex = {"docs": [...]}`,
//! meant to be evaluated by a browser rather than parsed as JSON. Two things it
//! emits are legal JavaScript but not JSON:
//! - a trailing comma after the last record
//! - raw tabs and other control characters inside string literals
//!
//! The payload is normalised before being handed to serde_json, keeping a map
//! back to the original bytes so parse errors point into the file the user has.

use crate::entry::IndexEntry;
use crate::error::LoadError;
use crate::index::SearchIndex;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

/// Matches the `var name =` prefix of the script form.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:var|let|const)\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=\s*")
        .expect("assignment pattern is valid")
});

#[derive(Deserialize)]
struct Envelope {
    docs: Vec<IndexEntry>,
}

/// Read and parse an index file.
pub fn load_path(path: &Path) -> Result<SearchIndex, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let index = load_str(&content)?;
    tracing::debug!("Loaded search index from {}", path.display());
    Ok(index)
}

/// Parse an index from its textual form.
///
/// Accepts the Documenter script, a bare `{"docs": [...]}` object, or a bare
/// array of records. An empty `docs` array is a valid, empty index.
pub fn load_str(input: &str) -> Result<SearchIndex, LoadError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let payload_start = ASSIGNMENT.find(input).map_or(0, |m| m.end());
    let payload = input[payload_start..]
        .trim_end()
        .trim_end_matches(';')
        .trim_end();
    let leading_ws = payload.len() - payload.trim_start().len();
    let payload_start = payload_start + leading_ws;
    let payload = payload.trim_start();

    let is_envelope = match payload.as_bytes().first() {
        Some(b'{') => true,
        Some(b'[') => false,
        Some(_) => {
            return Err(LoadError::Layout(format!(
                "expected '{{' or '[' at byte {}, found {:?}",
                payload_start,
                payload.chars().next().unwrap_or_default()
            )));
        }
        None => return Err(LoadError::Layout("input contains no index data".to_string())),
    };

    let normalized = normalize(payload);
    let entries = if is_envelope {
        serde_json::from_str::<Envelope>(&normalized.text).map(|envelope| envelope.docs)
    } else {
        serde_json::from_str::<Vec<IndexEntry>>(&normalized.text)
    }
    .map_err(|e| normalized.parse_error(&e, input, payload_start))?;

    let index = SearchIndex::new(entries)?;

    tracing::info!(
        "Parsed search index: {} entries ({})",
        index.len(),
        index
            .category_counts()
            .iter()
            .map(|(category, count)| format!("{} {}", count, category))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(index)
}

/// JSON text produced from the script payload, plus where each byte came from.
struct Normalized {
    text: String,
    /// For every byte of `text`, the byte offset in the payload it was produced from
    origin: Vec<usize>,
}

impl Normalized {
    fn push(&mut self, s: &str, from: usize) {
        self.text.push_str(s);
        self.origin.extend(std::iter::repeat_n(from, s.len()));
    }

    /// Translate a serde_json error position into a line/column of the original input.
    fn parse_error(&self, error: &serde_json::Error, input: &str, payload_start: usize) -> LoadError {
        if error.line() == 0 {
            return LoadError::from_json(error, 0);
        }

        let offset = byte_offset(&self.text, error.line(), error.column());
        let original = self
            .origin
            .get(offset)
            .or_else(|| self.origin.last())
            .map_or(payload_start, |o| payload_start + o);
        let (line, column) = line_column(input, original.min(input.len()));

        let message = error.to_string();
        let message = message
            .rsplit_once(" at line ")
            .map_or(message.as_str(), |(head, _)| head)
            .to_string();

        LoadError::Parse {
            line,
            column,
            message,
        }
    }
}

/// Rewrite a JavaScript object literal into strict JSON.
///
/// Drops commas that directly precede `]` or `}` and escapes control characters
/// inside strings. Everything else is copied through unchanged.
fn normalize(payload: &str) -> Normalized {
    let bytes = payload.as_bytes();
    let mut out = Normalized {
        text: String::with_capacity(payload.len()),
        origin: Vec::with_capacity(payload.len()),
    };

    let mut in_string = false;
    let mut escaped = false;
    // Start of the current run of bytes that is copied verbatim
    let mut run_start = 0;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];

        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            } else if b < 0x20 {
                flush(&mut out, payload, run_start, i);
                out.push(&control_escape(b), i);
                run_start = i + 1;
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == b',' {
            let next = bytes[i + 1..]
                .iter()
                .position(|c| !c.is_ascii_whitespace())
                .map(|p| bytes[i + 1 + p]);
            if matches!(next, Some(b']' | b'}')) {
                flush(&mut out, payload, run_start, i);
                run_start = i + 1;
            }
        }

        i += 1;
    }
    flush(&mut out, payload, run_start, bytes.len());

    out
}

fn flush(out: &mut Normalized, payload: &str, start: usize, end: usize) {
    if start < end {
        out.text.push_str(&payload[start..end]);
        out.origin.extend(start..end);
    }
}

fn control_escape(b: u8) -> String {
    match b {
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        _ => format!("\\u{:04x}", b),
    }
}

/// Byte offset for a 1-based line and serde_json column (count of bytes consumed on that line).
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let line_start = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum::<usize>();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// 1-based line and column (in characters) of a byte offset.
fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset;
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = input[line_start..offset].chars().count() + 1;
    (line, column)
}
