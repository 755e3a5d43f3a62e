//! Core library for fnlines.
//!
//! Annotates C functions with the number of significant lines in their body
//! and rewrites K&R-style `signature() {` lines into Allman style. Everything
//! here is a pure function from text to text (or to a report); reading and
//! writing files is left to the caller.
//!
//! # Modules
//!
//! - [`lexer`] - Comment and literal aware line scanner
//! - [`detect`] - Function signature and body detection
//! - [`count`] - Significant body line counting
//! - [`reformat`] - Allman-style reformatting
//! - [`annotate`] - Line-count annotations and the function report
//! - [`style`] - Read-only style report
//! - [`buffer`] - Line buffer and line-ending normalization
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! let source = "int add(int a, int b) { return (a + b); }\n";
//! let annotated = fnlines_core::annotate(source);
//!
//! assert_eq!(
//!     annotated,
//!     "// »»-----► Number of lines: 1\n\
//!      int add(int a, int b)\n\
//!      {\n\
//!      \treturn (a + b);\n\
//!      }\n"
//! );
//! ```
#![deny(unsafe_code)]

pub mod annotate;
pub mod buffer;
pub mod config;
pub mod count;
pub mod detect;
pub mod error;
pub mod lexer;
pub mod reformat;
pub mod style;

pub use annotate::{FunctionReport, FunctionSummary};
pub use buffer::SourceBuffer;
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use error::{ConfigError, ConfigResult, HostError};
pub use style::StyleReport;

/// Default maximum input size: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

/// Reformat, then annotate every function with its body line count.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn annotate(text: &str) -> String {
    let buffer = SourceBuffer::from_text(text);
    let formatted = reformat::reformat(&buffer);
    annotate::annotate(&formatted).to_text()
}

/// Reformat into Allman style without annotating.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn format_only(text: &str) -> String {
    reformat::reformat(&SourceBuffer::from_text(text)).to_text()
}

/// Remove every annotation line.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn strip_annotations(text: &str) -> String {
    annotate::strip_all(&SourceBuffer::from_text(text)).to_text()
}

/// Line totals and Allman compliance, without modifying anything.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn analyze(text: &str) -> StyleReport {
    style::analyze(&SourceBuffer::from_text(text))
}

/// Whether every function signature already has its `{` on the next line.
pub fn is_allman_compliant(text: &str) -> bool {
    analyze(text).is_allman_compliant()
}

/// Functions and body line counts, as [`annotate`] would compute them.
///
/// Line numbers refer to the reformatted text. With `max_lines` set, any
/// function whose body is longer fails the report.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn functions(text: &str, max_lines: Option<usize>) -> FunctionReport {
    let formatted = reformat::reformat(&SourceBuffer::from_text(text));
    annotate::function_report(&formatted, max_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "\
#include <unistd.h>

int\tft_strlen(char *s)
{
\tint\ti;

\ti = 0;
\twhile (s[i])
\t\ti++;
\treturn (i);
}

void\tft_putchar(char c) {
\twrite(1, &c, 1);
}
";

    #[test]
    fn annotate_is_idempotent() {
        let once = annotate(MIXED);
        assert_eq!(annotate(&once), once);
    }

    #[test]
    fn annotate_counts_each_function() {
        let out = annotate(MIXED);
        assert!(out.contains("// »»-----► Number of lines: 6\nint\tft_strlen(char *s)\n{"));
        assert!(out.contains("// »»-----► Number of lines: 1\nvoid\tft_putchar(char c)\n{"));
    }

    #[test]
    fn strip_after_annotate_equals_format_only() {
        let stripped = strip_annotations(&annotate(MIXED));
        assert!(!stripped.contains("»»-----►"));
        let formatted = format_only(MIXED);
        let expected: Vec<&str> = formatted.lines().filter(|l| !l.is_empty()).collect();
        let actual: Vec<&str> = stripped.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn format_only_is_idempotent() {
        let once = format_only(MIXED);
        assert_eq!(format_only(&once), once);
    }

    #[test]
    fn style_compliance_before_and_after_formatting() {
        let report = analyze(MIXED);
        assert_eq!(report.function_count, 2);
        assert_eq!(report.functions_formatted, 1);
        assert!(!is_allman_compliant(MIXED));

        let formatted = format_only(MIXED);
        assert_eq!(analyze(&formatted).functions_formatted, 2);
        assert!(is_allman_compliant(&formatted));
    }

    #[test]
    fn false_positives_are_not_annotated() {
        let text = "if (x)\n{\n}\nint f(void);\n";
        assert_eq!(annotate(text), text);
        assert!(functions(text, None).functions.is_empty());
    }

    #[test]
    fn crlf_input_produces_lf_output() {
        assert_eq!(
            annotate("int f(void)\r\n{\r\n}\r\n"),
            "// »»-----► Number of lines: 0\nint f(void)\n{\n}\n"
        );
    }

    #[test]
    fn function_report_matches_annotations() {
        let report = functions(MIXED, Some(5));
        let counts: Vec<(&str, usize)> = report
            .functions
            .iter()
            .map(|f| (f.name.as_str(), f.line_count))
            .collect();
        assert_eq!(counts, vec![("ft_strlen", 6), ("ft_putchar", 1)]);
        assert_eq!(report.over_limit, vec!["ft_strlen"]);
        assert!(!report.pass);
    }
}
