//! Significant body line counting.
//!
//! Only text between the function's outermost braces is considered. Each line
//! (or, on the brace lines, the part inside the braces) is classified once and
//! contributes 0 or 1:
//!
//! | Kind | Contributes |
//! |------|-------------|
//! | code | 1 |
//! | blank line strictly inside the body | 1 |
//! | comment only | 0 |
//! | `{`, `}`, `{ }` alone | 0 |
//!
//! A body with no code at all counts as 0 even if it holds blank lines.

use crate::lexer::{Delim, LexState, Pair, ScannedLine, scan_line, scan_lines};

/// What a body line (or brace-line fragment) holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace only, outside any comment.
    Blank,
    /// Nothing left once comments are removed.
    CommentOnly,
    /// A lone brace or an empty brace pair.
    BraceOnly,
    /// Anything else.
    Code,
}

fn classify(scanned: &ScannedLine, raw: &str) -> LineKind {
    if raw.trim().is_empty() && !scanned.entry.in_block_comment {
        return LineKind::Blank;
    }
    let code = scanned.code.trim();
    if code.is_empty() {
        return LineKind::CommentOnly;
    }
    if matches!(code, "{" | "}" | "{}" | "{ }") {
        return LineKind::BraceOnly;
    }
    LineKind::Code
}

/// Count significant body lines of the function spanning `start..=end`.
///
/// The signature is never counted. Text after the opening `{` on its line and
/// text before the closing `}` on its line count when they hold code. When
/// both braces share a line the count is 1 if anything sits between them.
pub fn count_body_lines<S: AsRef<str>>(lines: &[S], start: usize, end: usize) -> usize {
    let end = end.min(lines.len().saturating_sub(1));
    if start > end {
        return 0;
    }
    let span = &lines[start..=end];
    let scans: Vec<ScannedLine> =
        scan_lines(span.iter().map(AsRef::as_ref), LexState::new()).collect();

    let Some((open_line, open_offset)) = scans
        .iter()
        .enumerate()
        .find_map(|(i, s)| s.first(Delim::Open(Pair::Brace)).map(|off| (i, off)))
    else {
        return 0;
    };

    let mut depth = 0;
    let close = scans
        .iter()
        .enumerate()
        .skip(open_line)
        .find_map(|(i, s)| {
            let from = if i == open_line { open_offset } else { 0 };
            s.balance_from(from, Pair::Brace, &mut depth).map(|off| (i, off))
        });
    let (close_line, close_offset) =
        close.unwrap_or((scans.len() - 1, span[scans.len() - 1].as_ref().len()));

    if open_line == close_line {
        let inner = &span[open_line].as_ref()[open_offset + 1..close_offset];
        let scanned = scan_line(inner, LexState::new());
        return usize::from(!scanned.is_code_blank());
    }

    let mut kinds = Vec::with_capacity(close_line - open_line + 1);

    let after_open = &span[open_line].as_ref()[open_offset + 1..];
    kinds.push(edge_kind(after_open, LexState::new()));

    for (scanned, raw) in scans[open_line + 1..close_line]
        .iter()
        .zip(&span[open_line + 1..close_line])
    {
        kinds.push(classify(scanned, raw.as_ref()));
    }

    let before_close = &span[close_line].as_ref()[..close_offset];
    kinds.push(edge_kind(before_close, scans[close_line].entry));

    if !kinds.contains(&LineKind::Code) {
        return 0;
    }

    // Blank fragments on the brace lines are not body lines.
    let last = kinds.len() - 1;
    kinds
        .iter()
        .enumerate()
        .filter(|&(i, kind)| match kind {
            LineKind::Code => true,
            LineKind::Blank => i != 0 && i != last,
            LineKind::CommentOnly | LineKind::BraceOnly => false,
        })
        .count()
}

fn edge_kind(fragment: &str, state: LexState) -> LineKind {
    let scanned = scan_line(fragment, state);
    classify(&scanned, fragment)
}
