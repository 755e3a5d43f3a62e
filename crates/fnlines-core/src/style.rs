//! Read-only style report.
//!
//! Uses a line-local signature heuristic instead of the full detector: it
//! only needs to tell whether a signature already has its `{` on the next
//! line.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::buffer::SourceBuffer;

/// Words that start statements which look like calls.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "printf", "write",
];

static SIGNATURE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s\w*]*\s+\w+\s*\([^)]*\)\s*\{?$").expect("valid regex")
});

/// Line totals and Allman compliance for a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StyleReport {
    /// Number of lines in the buffer.
    pub total_lines: usize,
    /// Lines that are neither blank nor comments.
    pub code_lines: usize,
    /// Lines starting with a comment marker.
    pub comment_lines: usize,
    /// Whitespace-only lines.
    pub empty_lines: usize,
    /// Lines that look like function signatures.
    pub function_count: usize,
    /// Signatures whose `{` sits alone on the following line.
    pub functions_formatted: usize,
}

impl StyleReport {
    /// Every detected signature is already in Allman style.
    pub const fn is_allman_compliant(&self) -> bool {
        self.function_count == self.functions_formatted
    }
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("<!--")
}

/// Heuristic signature test on a trimmed line.
fn looks_like_signature(trimmed: &str) -> bool {
    if !trimmed.contains('(') || !trimmed.contains(')') {
        return false;
    }
    let starts_statement = STATEMENT_KEYWORDS.iter().any(|kw| {
        trimmed
            .strip_prefix(kw)
            .is_some_and(|rest| rest.starts_with([' ', '(']))
    });
    if starts_statement || !trimmed.contains(' ') {
        return false;
    }
    SIGNATURE_SHAPE.is_match(trimmed)
}

/// Compute the style report for a sequence of lines.
pub fn analyze_lines<S: AsRef<str>>(lines: &[S]) -> StyleReport {
    let mut report = StyleReport {
        total_lines: lines.len(),
        ..StyleReport::default()
    };

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() {
            report.empty_lines += 1;
            continue;
        }
        if is_comment(trimmed) {
            report.comment_lines += 1;
            continue;
        }
        report.code_lines += 1;

        if trimmed.starts_with('#') || !looks_like_signature(trimmed) {
            continue;
        }
        report.function_count += 1;
        let brace_follows = lines
            .get(index + 1)
            .is_some_and(|next| next.as_ref().trim() == "{");
        if !trimmed.contains('{') && brace_follows {
            report.functions_formatted += 1;
        }
    }

    report
}

/// Style report for a buffer.
#[tracing::instrument(skip_all, fields(lines = buffer.len()))]
pub fn analyze(buffer: &SourceBuffer) -> StyleReport {
    let report = analyze_lines(buffer.lines());
    tracing::debug!(
        functions = report.function_count,
        formatted = report.functions_formatted,
        "style analyzed"
    );
    report
}
