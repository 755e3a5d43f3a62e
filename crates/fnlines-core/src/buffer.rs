//! Source buffer handling.
//!
//! Every core operation works on a [`SourceBuffer`]: the input text split into
//! lines after `\r\n` and lone `\r` terminators have been folded into `\n`.
//! Output is always joined with `\n`; carriage returns are not restored.

/// An ordered sequence of text lines with line endings removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    lines: Vec<String>,
}

impl SourceBuffer {
    /// Split `text` into lines, normalizing line terminators first.
    ///
    /// Splitting is on every `\n`, so a trailing newline produces a final
    /// empty line and [`SourceBuffer::to_text`] reproduces it.
    pub fn from_text(text: &str) -> Self {
        let normalized = normalize_line_endings(text);
        Self {
            lines: normalized.split('\n').map(str::to_string).collect(),
        }
    }

    /// Wrap already-split lines.
    pub const fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Borrow the lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the buffer, returning its lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the buffer holds no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the lines back into text with `\n` terminators.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Fold `\r\n` and lone `\r` into `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Leading whitespace of `line`.
pub(crate) fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}
