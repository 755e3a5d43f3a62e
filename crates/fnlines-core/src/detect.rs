//! Function boundary detection.
//!
//! Deciding whether a line opens a function definition is a short chain of
//! rejection rules followed by one acceptance test. Every rule yields a
//! [`Rejection`] so that the decision can be inspected (and logged) instead of
//! collapsing into a bare `bool`.
//!
//! Once a signature is accepted, [`find_body`] walks forward with the lexer to
//! the line whose `}` brings the brace balance back to zero.

use std::sync::LazyLock;

use regex::Regex;

use crate::count::count_body_lines;
use crate::lexer::{Delim, LexState, Pair, scan_line, strip_comments};

/// How many lines a wrapped signature may span.
pub const SIGNATURE_LOOKAHEAD: usize = 10;

/// How many lines past the signature the opening brace may appear.
pub const BODY_LOOKAHEAD: usize = 10;

/// Words that, as the last token before `name(`, mark an expression or
/// control statement rather than a return type.
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "switch", "return", "sizeof"];

/// Identifiers that can be followed by `(` without being a function name.
const NON_FUNCTION_NAMES: &[&str] = &[
    "if",
    "while",
    "for",
    "switch",
    "return",
    "sizeof",
    "do",
    "else",
    "case",
    "goto",
    "defined",
    "_Alignof",
    "_Generic",
    "_Static_assert",
];

/// First identifier directly followed by an opening parenthesis.
static CANDIDATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*\(").expect("valid regex"));

/// Why a line was not accepted as the start of a function definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or whitespace-only line.
    Blank,
    /// Line comment, block comment start or comment continuation.
    Comment,
    /// Preprocessor directive.
    Preprocessor,
    /// `typedef`, or `struct`/`enum`/`union` without a parameter list.
    TypeDeclaration,
    /// Ends with `;`: a prototype or declaration.
    Terminated,
    /// No identifier followed by `(`.
    NoCandidateName,
    /// Nothing precedes the candidate name.
    MissingReturnType,
    /// The text before the name is not a plain type (operators, braces, ...).
    NotADeclaration,
    /// The name or the word before it is a control-flow keyword.
    ControlKeyword,
    /// The parameter list never closes.
    UnbalancedParens,
    /// Something other than `{` follows the parameter list.
    TrailingText,
    /// A wrapped signature did not close within the lookahead window.
    UnterminatedSignature,
    /// A wrapped candidate ran into the end of an earlier statement.
    StatementBoundary,
}

impl Rejection {
    /// Short, stable label for logging.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Comment => "comment",
            Self::Preprocessor => "preprocessor",
            Self::TypeDeclaration => "type-declaration",
            Self::Terminated => "terminated",
            Self::NoCandidateName => "no-candidate-name",
            Self::MissingReturnType => "missing-return-type",
            Self::NotADeclaration => "not-a-declaration",
            Self::ControlKeyword => "control-keyword",
            Self::UnbalancedParens => "unbalanced-parens",
            Self::TrailingText => "trailing-text",
            Self::UnterminatedSignature => "unterminated-signature",
            Self::StatementBoundary => "statement-boundary",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a candidate signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Looks like a function definition; `name` is the candidate identifier.
    Candidate {
        /// The identifier directly before the parameter list.
        name: String,
    },
    /// Not a function definition.
    Rejected(Rejection),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Candidate`].
    pub const fn is_candidate(&self) -> bool {
        matches!(self, Self::Candidate { .. })
    }

    /// The rejection reason, if any.
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Candidate { .. } => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// A function definition located in a buffer.
///
/// Line numbers are 0-based indices into the buffer. The range
/// `start_line..=end_line` covers the whole definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    /// First line of the signature.
    pub start_line: usize,
    /// Line holding the opening `{`.
    pub open_line: usize,
    /// Line holding the `}` that balances the opening brace.
    pub end_line: usize,
    /// Signature text up to the opening brace, whitespace collapsed.
    pub signature: String,
    /// Candidate function name taken from the signature.
    pub name: String,
    /// Significant body lines, see [`count_body_lines`].
    pub line_count: usize,
}

/// Rules that reject a line by its leading text alone.
fn reject_by_prefix(trimmed: &str) -> Option<Rejection> {
    if trimmed.is_empty() {
        return Some(Rejection::Blank);
    }
    if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
        return Some(Rejection::Comment);
    }
    if trimmed.starts_with('#') {
        return Some(Rejection::Preprocessor);
    }
    let has_paren = trimmed.contains('(');
    match leading_word(trimmed) {
        "typedef" => Some(Rejection::TypeDeclaration),
        "struct" | "enum" | "union" if !has_paren => Some(Rejection::TypeDeclaration),
        _ => None,
    }
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !is_ident_char(c))
        .unwrap_or(text.len());
    &text[..end]
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Acceptance test applied to comment-free signature text.
///
/// The first identifier directly followed by `(` is the candidate name. The
/// text before it must be a non-empty run of type words and `*`, not ending
/// in a control keyword; the parameter list must close; and only `{` (or
/// nothing) may follow it.
pub fn validate_signature(text: &str) -> Verdict {
    let Some(captures) = CANDIDATE_NAME.captures(text) else {
        return Verdict::Rejected(Rejection::NoCandidateName);
    };
    let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
        return Verdict::Rejected(Rejection::NoCandidateName);
    };

    let before = text[..name.start()].trim();
    if before.is_empty() {
        return Verdict::Rejected(Rejection::MissingReturnType);
    }
    if !before
        .chars()
        .all(|c| is_ident_char(c) || c.is_whitespace() || c == '*')
    {
        return Verdict::Rejected(Rejection::NotADeclaration);
    }
    let last_word = before
        .split(|c: char| c.is_whitespace() || c == '*')
        .rfind(|w| !w.is_empty())
        .unwrap_or_default();
    if CONTROL_KEYWORDS.contains(&last_word) || NON_FUNCTION_NAMES.contains(&name.as_str()) {
        return Verdict::Rejected(Rejection::ControlKeyword);
    }

    // The match ends just past the `(`.
    let open_paren = whole.end() - 1;
    let scanned = scan_line(text, LexState::new());
    let mut depth = 0;
    let Some(close_paren) = scanned.balance_from(open_paren, Pair::Paren, &mut depth) else {
        return Verdict::Rejected(Rejection::UnbalancedParens);
    };

    let after = text[close_paren + 1..].trim();
    if !after.is_empty() && !after.starts_with('{') {
        return Verdict::Rejected(Rejection::TrailingText);
    }

    Verdict::Candidate {
        name: name.as_str().to_string(),
    }
}

/// Classify a single line as a possible function start.
pub fn classify_line(line: &str) -> Verdict {
    let trimmed = line.trim();
    if let Some(reason) = reject_by_prefix(trimmed) {
        return Verdict::Rejected(reason);
    }
    let code = strip_comments(trimmed);
    let code = code.trim();
    if code.ends_with(';') {
        return Verdict::Rejected(Rejection::Terminated);
    }
    validate_signature(code)
}

/// Classify the signature starting at `index`, letting it wrap across up to
/// [`SIGNATURE_LOOKAHEAD`] lines.
///
/// Lines are accumulated (comment lines skipped) until the parenthesis depth
/// returns to zero, then the joined text goes through [`validate_signature`].
pub fn classify_multiline<S: AsRef<str>>(lines: &[S], index: usize) -> Verdict {
    let Some(first) = lines.get(index) else {
        return Verdict::Rejected(Rejection::Blank);
    };
    if let Some(reason) = reject_by_prefix(first.as_ref().trim()) {
        return Verdict::Rejected(reason);
    }

    let window_end = lines.len().min(index + SIGNATURE_LOOKAHEAD);
    let mut signature = String::new();
    let mut depth: isize = 0;
    let mut seen_paren = false;
    let mut closed = false;

    for line in &lines[index..window_end] {
        let trimmed = line.as_ref().trim();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") {
            continue;
        }
        let scanned = scan_line(trimmed, LexState::new());
        let code = scanned.code.trim();
        let opens_paren = scanned.first(Delim::Open(Pair::Paren)).is_some();

        if !seen_paren && !opens_paren && code.ends_with([';', '{', '}']) {
            return Verdict::Rejected(Rejection::StatementBoundary);
        }

        signature.push(' ');
        signature.push_str(code);
        depth += scanned.net(Pair::Paren);
        seen_paren |= opens_paren;

        if seen_paren && depth == 0 {
            closed = true;
            break;
        }
    }

    if !closed {
        return Verdict::Rejected(Rejection::UnterminatedSignature);
    }
    let signature = signature.trim();
    if signature.ends_with(';') {
        return Verdict::Rejected(Rejection::Terminated);
    }
    validate_signature(signature)
}

/// Returns `true` if `line` alone is a function signature.
pub fn is_function_start(line: &str) -> bool {
    classify_line(line).is_candidate()
}

/// Returns `true` if a (possibly wrapped) signature starts at `index`.
pub fn is_function_start_multiline<S: AsRef<str>>(lines: &[S], index: usize) -> bool {
    classify_multiline(lines, index).is_candidate()
}

/// Find the body of the function whose signature starts at `start`.
///
/// Returns `None` when no `{` appears within [`BODY_LOOKAHEAD`] lines of the
/// signature or when the braces never balance before the buffer ends.
pub fn find_body<S: AsRef<str>>(lines: &[S], start: usize) -> Option<FunctionSpan> {
    let mut state = LexState::new();
    let mut depth = 0usize;
    let mut open: Option<(usize, usize)> = None;

    for (index, line) in lines.iter().enumerate().skip(start) {
        let scanned = scan_line(line.as_ref(), state);
        state = scanned.exit;

        for mark in &scanned.marks {
            match mark.delim {
                Delim::Open(Pair::Brace) => {
                    depth += 1;
                    open.get_or_insert((index, mark.offset));
                }
                Delim::Close(Pair::Brace) if depth > 0 => {
                    depth -= 1;
                    if depth == 0
                        && let Some((open_line, open_offset)) = open
                    {
                        let signature = signature_text(lines, start, open_line, open_offset);
                        let name = match validate_signature(&signature) {
                            Verdict::Candidate { name } => name,
                            Verdict::Rejected(_) => String::new(),
                        };
                        return Some(FunctionSpan {
                            start_line: start,
                            open_line,
                            end_line: index,
                            signature,
                            name,
                            line_count: count_body_lines(lines, start, index),
                        });
                    }
                }
                _ => {}
            }
        }

        if open.is_none() && index + 1 - start > BODY_LOOKAHEAD {
            tracing::trace!(start, "no opening brace within lookahead");
            return None;
        }
    }

    tracing::trace!(start, found_open = open.is_some(), "body never balanced");
    None
}

/// Join the signature lines up to the opening brace.
fn signature_text<S: AsRef<str>>(
    lines: &[S],
    start: usize,
    open_line: usize,
    open_offset: usize,
) -> String {
    let mut parts: Vec<String> = lines[start..open_line]
        .iter()
        .map(|l| strip_comments(l.as_ref()))
        .collect();
    parts.push(strip_comments(&lines[open_line].as_ref()[..open_offset]));
    parts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detect a function definition starting at `index`.
///
/// Tries the single-line rules first, then the wrapped-signature rules, then
/// looks for the body. Rejections are logged at trace level and otherwise
/// ignored.
pub fn detect_function<S: AsRef<str>>(lines: &[S], index: usize) -> Option<FunctionSpan> {
    let line = lines.get(index)?.as_ref();
    let single = classify_line(line);
    if !single.is_candidate() {
        let wrapped = classify_multiline(lines, index);
        if let Verdict::Rejected(reason) = wrapped {
            if !matches!(reason, Rejection::Blank | Rejection::Comment) {
                tracing::trace!(line = index + 1, reason = %reason, "not a function start");
            }
            return None;
        }
    }

    let span = find_body(lines, index);
    match &span {
        Some(span) => tracing::debug!(
            name = %span.name,
            start = span.start_line + 1,
            end = span.end_line + 1,
            lines = span.line_count,
            "function detected"
        ),
        None => tracing::debug!(line = index + 1, "signature without a balanced body"),
    }
    span
}
