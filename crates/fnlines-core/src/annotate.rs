//! Line-count annotations.
//!
//! Each detected function gets exactly one comment of the form
//!
//! ```text
//! // »»-----► Number of lines: 12
//! ```
//!
//! on the line directly above its signature. Annotations are recognized by
//! prefix alone, so stale ones are dropped and rewritten on every pass.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::buffer::SourceBuffer;
use crate::detect::{FunctionSpan, detect_function};
use crate::lexer::{LexState, scan_line, scan_lines};

/// Literal prefix every annotation starts with.
pub const ANNOTATION_PREFIX: &str = "// »»-----►";

/// Render the annotation for a body of `line_count` lines.
pub fn annotation_comment(line_count: usize) -> String {
    format!("{ANNOTATION_PREFIX} Number of lines: {line_count}")
}

/// Returns `true` if `line` is an annotation, ignoring surrounding whitespace.
pub fn is_annotation(line: &str) -> bool {
    line.trim().starts_with(ANNOTATION_PREFIX)
}

/// Walk the buffer and return every function span in order.
///
/// Scanning resumes after each function's closing brace. Lines inside a
/// top-level block comment are never treated as signatures.
pub fn find_functions<S: AsRef<str>>(lines: &[S]) -> Vec<FunctionSpan> {
    let mut spans = Vec::new();
    let mut state = LexState::new();
    let mut index = 0;

    while index < lines.len() {
        if !state.in_block_comment
            && let Some(span) = detect_function(lines, index)
        {
            state = exit_state(&lines[span.start_line..=span.end_line], state);
            index = span.end_line + 1;
            spans.push(span);
            continue;
        }
        state = scan_line(lines[index].as_ref(), state).exit;
        index += 1;
    }

    spans
}

fn exit_state<S: AsRef<str>>(lines: &[S], state: LexState) -> LexState {
    scan_lines(lines.iter().map(|l| l.as_ref()), state)
        .last()
        .map_or(state, |scanned| scanned.exit)
}

/// Insert a fresh annotation above every function and drop stale ones.
///
/// Annotations and blank lines directly above a function are replaced by the
/// new annotation. Annotations anywhere else are removed. All other lines
/// are copied unchanged.
pub fn annotate_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + lines.len() / 8);
    let mut state = LexState::new();
    let mut index = 0;
    let mut annotated = 0usize;

    while index < lines.len() {
        if !state.in_block_comment
            && let Some(span) = detect_function(lines, index)
        {
            while out
                .last()
                .is_some_and(|l| is_annotation(l) || l.trim().is_empty())
            {
                out.pop();
            }
            out.push(annotation_comment(span.line_count));
            let body = &lines[span.start_line..=span.end_line];
            out.extend(body.iter().map(|l| l.as_ref().to_string()));
            state = exit_state(body, state);
            index = span.end_line + 1;
            annotated += 1;
            continue;
        }

        let line = lines[index].as_ref();
        state = scan_line(line, state).exit;
        if !is_annotation(line) {
            out.push(line.to_string());
        }
        index += 1;
    }

    tracing::debug!(annotated, "annotation pass complete");
    out
}

/// Annotate a whole buffer. The buffer is not reformatted first.
#[tracing::instrument(skip_all, fields(lines = buffer.len()))]
pub fn annotate(buffer: &SourceBuffer) -> SourceBuffer {
    SourceBuffer::from_lines(annotate_lines(buffer.lines()))
}

/// Remove every annotation line, leaving everything else untouched.
pub fn strip_all(buffer: &SourceBuffer) -> SourceBuffer {
    let kept = buffer
        .lines()
        .iter()
        .filter(|l| !is_annotation(l))
        .cloned()
        .collect();
    SourceBuffer::from_lines(kept)
}

/// One detected function, with 1-based line numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionSummary {
    /// Function name, or the signature when no name could be extracted.
    pub name: String,
    /// First line of the signature.
    pub start_line: usize,
    /// Line of the closing brace.
    pub end_line: usize,
    /// Significant body lines.
    pub line_count: usize,
}

impl From<&FunctionSpan> for FunctionSummary {
    fn from(span: &FunctionSpan) -> Self {
        let name = if span.name.is_empty() {
            span.signature.clone()
        } else {
            span.name.clone()
        };
        Self {
            name,
            start_line: span.start_line + 1,
            end_line: span.end_line + 1,
            line_count: span.line_count,
        }
    }
}

/// Detected functions and the outcome of the optional length gate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FunctionReport {
    /// Every function in source order.
    pub functions: Vec<FunctionSummary>,
    /// Maximum body length checked against, if any.
    pub max_lines: Option<usize>,
    /// Names of functions whose body is longer than `max_lines`.
    pub over_limit: Vec<String>,
    /// Whether every function is within the limit.
    pub pass: bool,
}

/// Build a [`FunctionReport`] for `buffer`.
pub fn function_report(buffer: &SourceBuffer, max_lines: Option<usize>) -> FunctionReport {
    let functions: Vec<FunctionSummary> = find_functions(buffer.lines())
        .iter()
        .map(FunctionSummary::from)
        .collect();
    let over_limit: Vec<String> = max_lines
        .map(|max| {
            functions
                .iter()
                .filter(|f| f.line_count > max)
                .map(|f| f.name.clone())
                .collect()
        })
        .unwrap_or_default();
    let pass = over_limit.is_empty();

    FunctionReport {
        functions,
        max_lines,
        over_limit,
        pass,
    }
}
