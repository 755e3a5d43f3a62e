//! Allman-style reformatting.
//!
//! A single pass over the buffer rewrites lines that put a brace next to other
//! code:
//!
//! 1. comment, blank and preprocessor lines pass through;
//! 2. `signature(...) { body }` splits into signature, `{`, one line per
//!    statement, `}` and any trailing text;
//! 3. `{ }` splits into `{` and `}`;
//! 4. `stmt; }` splits into `stmt;` and a `}` one indent level shallower;
//! 5. everything else passes through.
//!
//! Pieces produced by a rule are fed through the rules again, so the output
//! is a fixed point and reformatting twice changes nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::buffer::{SourceBuffer, indentation};
use crate::detect::validate_signature;
use crate::lexer::{Delim, LexState, Pair, ScannedLine, scan_line};

/// Indentation added in front of statements split out of a one-line body.
pub const STATEMENT_INDENT: &str = "\t";

static EMPTY_BRACE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\s*\}$").expect("valid regex"));

/// Reformat a whole buffer.
#[tracing::instrument(skip_all, fields(lines = buffer.len()))]
pub fn reformat(buffer: &SourceBuffer) -> SourceBuffer {
    SourceBuffer::from_lines(reformat_lines(buffer.lines()))
}

/// Reformat a sequence of lines.
pub fn reformat_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut state = LexState::new();
    let mut rewritten = 0usize;

    for line in lines {
        let line = line.as_ref();
        let scanned = scan_line(line, state);
        state = scanned.exit;

        if scanned.entry.in_block_comment {
            out.push(line.to_string());
            continue;
        }
        let before = out.len();
        rewrite_into(line, &scanned, &mut out);
        if out.len() - before > 1 {
            rewritten += 1;
        }
    }

    tracing::debug!(rewritten, "reformat pass complete");
    out
}

/// Apply the rules to `line` until every piece is stable.
fn rewrite_into(line: &str, scanned: &ScannedLine, out: &mut Vec<String>) {
    match apply_rules(line, scanned) {
        None => out.push(line.to_string()),
        Some(pieces) => {
            for piece in pieces {
                let piece_scan = scan_line(&piece, LexState::new());
                rewrite_into(&piece, &piece_scan, out);
            }
        }
    }
}

/// One rule application. `None` means the line is left alone.
fn apply_rules(line: &str, scanned: &ScannedLine) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
    {
        return None;
    }

    if let Some(brace) = signature_brace(line, scanned) {
        return Some(split_signature_line(line, scanned, brace));
    }
    if EMPTY_BRACE_PAIR.is_match(trimmed) {
        let indent = indentation(line);
        return Some(vec![format!("{indent}{{"), format!("{indent}}}")]);
    }
    closing_brace_split(line, scanned)
}

/// Offset of the `{` on a `signature {` line, if the line is one.
fn signature_brace(line: &str, scanned: &ScannedLine) -> Option<usize> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('{') {
        return None;
    }
    let brace = scanned.first(Delim::Open(Pair::Brace))?;
    let head = scan_line(&line[..brace], LexState::new()).code;
    if !head.contains('(') || !head.contains(')') {
        return None;
    }
    validate_signature(head.trim()).is_candidate().then_some(brace)
}

fn split_signature_line(line: &str, scanned: &ScannedLine, brace: usize) -> Vec<String> {
    let indent = indentation(line);
    let signature = line[..brace].trim();
    let after = &line[brace + 1..];

    let mut out = vec![format!("{indent}{signature}"), format!("{indent}{{")];
    if after.trim().is_empty() {
        return out;
    }

    let mut depth = 0;
    match scanned.balance_from(brace, Pair::Brace, &mut depth) {
        Some(close) => {
            let content = line[brace + 1..close].trim();
            for statement in split_statements(content) {
                out.push(format!("{indent}{STATEMENT_INDENT}{statement}"));
            }
            out.push(format!("{indent}}}"));
            let trailing = line[close + 1..].trim();
            if !trailing.is_empty() {
                out.push(format!("{indent}{trailing}"));
            }
        }
        None => out.push(format!("{indent}{STATEMENT_INDENT}{}", after.trim())),
    }
    out
}

/// Split a one-line body into statements at top-level `;`.
///
/// Semicolons inside parentheses, nested braces, literals and comments do
/// not split. Each piece keeps its terminator.
pub fn split_statements(content: &str) -> Vec<String> {
    let scanned = scan_line(content, LexState::new());
    let mut statements = Vec::new();
    let mut depth = 0isize;
    let mut start = 0;

    for mark in &scanned.marks {
        match mark.delim {
            Delim::Open(_) => depth += 1,
            Delim::Close(_) => depth -= 1,
            Delim::Semicolon if depth <= 0 => {
                statements.push(content[start..=mark.offset].trim().to_string());
                start = mark.offset + 1;
            }
            Delim::Semicolon => {}
        }
    }
    statements.push(content[start..].trim().to_string());
    statements.retain(|s| !s.is_empty() && s != ";");
    statements
}

/// Rule 4: `content }` becomes `content` and a shallower `}`.
fn closing_brace_split(line: &str, scanned: &ScannedLine) -> Option<Vec<String>> {
    let trimmed = line.trim_end();
    if !trimmed.ends_with('}') {
        return None;
    }
    let brace = trimmed.len() - 1;
    if scanned.last(Delim::Close(Pair::Brace)) != Some(brace) {
        return None;
    }
    let indent = indentation(line);
    let content = line[..brace].trim();
    if content.is_empty() || content == "{" {
        return None;
    }
    let closing_indent = dedent(indent);
    Some(vec![format!("{indent}{content}"), format!("{closing_indent}}}")])
}

/// Remove one indent unit from the end of `indent`: a tab, else four
/// spaces, else one character.
pub fn dedent(indent: &str) -> &str {
    if let Some(rest) = indent.strip_suffix('\t') {
        rest
    } else if let Some(rest) = indent.strip_suffix("    ") {
        rest
    } else {
        let mut chars = indent.chars();
        chars.next_back();
        chars.as_str()
    }
}
