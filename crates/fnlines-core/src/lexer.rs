//! Line-oriented lexical scanning for C source.
//!
//! The scanner walks one line at a time and tracks just enough state to know
//! which characters are code: string literals, character literals, line
//! comments and block comments are opaque. Only the block-comment flag
//! survives a line break, so it is the whole of [`LexState`]; callers thread
//! it from one [`scan_line`] call to the next.
//!
//! ```
//! use fnlines_core::lexer::{LexState, scan_line};
//!
//! let first = scan_line("int x; /* { opens", LexState::default());
//! assert!(first.exit.in_block_comment);
//!
//! let second = scan_line("still } comment */ y = 1;", first.exit);
//! assert!(!second.exit.in_block_comment);
//! assert!(second.marks.iter().all(|m| m.offset > 17));
//! ```

/// Scanner state carried across a line break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexState {
    /// The line ends inside an unterminated `/* ... */` comment.
    pub in_block_comment: bool,
}

impl LexState {
    /// State at the start of a file.
    pub const fn new() -> Self {
        Self {
            in_block_comment: false,
        }
    }
}

/// A bracket kind tracked for balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    /// `{` and `}`.
    Brace,
    /// `(` and `)`.
    Paren,
}

/// A structural character found in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// An opening `{` or `(`.
    Open(Pair),
    /// A closing `}` or `)`.
    Close(Pair),
    /// A `;` statement terminator.
    Semicolon,
}

impl Delim {
    const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '{' => Some(Self::Open(Pair::Brace)),
            '}' => Some(Self::Close(Pair::Brace)),
            '(' => Some(Self::Open(Pair::Paren)),
            ')' => Some(Self::Close(Pair::Paren)),
            ';' => Some(Self::Semicolon),
            _ => None,
        }
    }
}

/// A delimiter and its byte offset in the scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    /// Byte offset into the original line.
    pub offset: usize,
    /// Which delimiter sits there.
    pub delim: Delim,
}

/// Result of scanning one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// State the line was entered with.
    pub entry: LexState,
    /// State to hand to the next line.
    pub exit: LexState,
    /// The line with comment text removed. Each removed block comment leaves
    /// a single space; literals are kept verbatim.
    pub code: String,
    /// Delimiters found outside literals and comments, in order.
    pub marks: Vec<Mark>,
    /// The line touches a comment (opens, closes or sits inside one).
    pub has_comment: bool,
}

impl ScannedLine {
    /// Returns `true` if nothing but whitespace remains once comments are removed.
    pub fn is_code_blank(&self) -> bool {
        self.code.trim().is_empty()
    }

    /// Offset of the first occurrence of `delim`.
    pub fn first(&self, delim: Delim) -> Option<usize> {
        self.marks
            .iter()
            .find(|m| m.delim == delim)
            .map(|m| m.offset)
    }

    /// Offset of the last occurrence of `delim`.
    pub fn last(&self, delim: Delim) -> Option<usize> {
        self.marks
            .iter()
            .rev()
            .find(|m| m.delim == delim)
            .map(|m| m.offset)
    }

    /// Continue a balance count for `pair` across this line.
    ///
    /// `depth` is the number of unmatched openers seen so far and is updated
    /// in place. Returns the offset of the closer that brings the count back
    /// to zero, if one occurs on this line. Closers seen at depth zero are
    /// ignored.
    pub fn balance(&self, pair: Pair, depth: &mut usize) -> Option<usize> {
        self.balance_from(0, pair, depth)
    }

    /// Like [`ScannedLine::balance`], considering only marks at or after `start`.
    pub fn balance_from(&self, start: usize, pair: Pair, depth: &mut usize) -> Option<usize> {
        for mark in self.marks.iter().filter(|m| m.offset >= start) {
            match mark.delim {
                Delim::Open(p) if p == pair => *depth += 1,
                Delim::Close(p) if p == pair && *depth > 0 => {
                    *depth -= 1;
                    if *depth == 0 {
                        return Some(mark.offset);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Net change in `pair` depth across the line.
    pub fn net(&self, pair: Pair) -> isize {
        self.marks.iter().fold(0, |acc, m| match m.delim {
            Delim::Open(p) if p == pair => acc + 1,
            Delim::Close(p) if p == pair => acc - 1,
            _ => acc,
        })
    }
}

/// Scan `line` starting in `state`.
///
/// Quotes open a literal unless already inside the other kind of literal. A
/// quote closes its literal only when preceded by an even number of
/// backslashes. An unterminated literal runs to the end of the line and is
/// not carried over.
pub fn scan_line(line: &str, state: LexState) -> ScannedLine {
    let mut in_block_comment = state.in_block_comment;
    let mut in_string = false;
    let mut in_char = false;
    let mut has_comment = in_block_comment;
    let mut backslashes = 0usize;
    let mut code = String::with_capacity(line.len());
    let mut marks = Vec::new();

    let mut chars = line.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);

        if in_block_comment {
            if ch == '*' && next == Some('/') {
                chars.next();
                in_block_comment = false;
                code.push(' ');
            }
            continue;
        }

        if !in_string && !in_char && ch == '/' {
            if next == Some('/') {
                has_comment = true;
                break;
            }
            if next == Some('*') {
                chars.next();
                in_block_comment = true;
                has_comment = true;
                backslashes = 0;
                continue;
            }
        }

        let escaped = backslashes % 2 == 1;
        backslashes = if ch == '\\' { backslashes + 1 } else { 0 };

        match ch {
            '"' if !in_char => in_string = !in_string || escaped,
            '\'' if !in_string => in_char = !in_char || escaped,
            _ if !in_string && !in_char => {
                if let Some(delim) = Delim::from_char(ch) {
                    marks.push(Mark { offset, delim });
                }
            }
            _ => {}
        }
        code.push(ch);
    }

    ScannedLine {
        entry: state,
        exit: LexState { in_block_comment },
        code,
        marks,
        has_comment,
    }
}

/// Scan a run of lines, threading [`LexState`] from each line to the next.
pub fn scan_lines<'a, I>(lines: I, state: LexState) -> impl Iterator<Item = ScannedLine>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().scan(state, |state, line| {
        let scanned = scan_line(line, *state);
        *state = scanned.exit;
        Some(scanned)
    })
}

/// Text of `line` with comments removed, assuming it starts outside a comment.
pub fn strip_comments(line: &str) -> String {
    scan_line(line, LexState::new()).code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delims(line: &str) -> Vec<Delim> {
        scan_line(line, LexState::new())
            .marks
            .into_iter()
            .map(|m| m.delim)
            .collect()
    }

    #[test]
    fn plain_code_marks_all_delimiters() {
        assert_eq!(
            delims("f(a) { b; }"),
            vec![
                Delim::Open(Pair::Paren),
                Delim::Close(Pair::Paren),
                Delim::Open(Pair::Brace),
                Delim::Semicolon,
                Delim::Close(Pair::Brace),
            ]
        );
    }

    #[test]
    fn string_literal_braces_are_opaque() {
        assert!(delims(r#"s = "{";"#).iter().all(|d| *d == Delim::Semicolon));
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        assert_eq!(delims(r#"s = "a\"{"; }"#).last(), Some(&Delim::Close(Pair::Brace)));
        assert_eq!(delims(r#"s = "a\"{"; }"#).len(), 2);
    }

    #[test]
    fn even_backslashes_close_string() {
        // "\\" is a complete literal holding one backslash
        let scanned = scan_line(r#"s = "\\"; {"#, LexState::new());
        assert_eq!(scanned.first(Delim::Open(Pair::Brace)), Some(10));
    }

    #[test]
    fn char_literal_braces_are_opaque() {
        assert!(delims("c = '{';").iter().all(|d| *d == Delim::Semicolon));
        assert_eq!(delims(r"c = '\''; {").last(), Some(&Delim::Open(Pair::Brace)));
    }

    #[test]
    fn quote_inside_other_literal_is_ignored() {
        assert_eq!(delims(r#"c = '"'; {"#).last(), Some(&Delim::Open(Pair::Brace)));
        assert_eq!(delims(r#"s = "'"; {"#).last(), Some(&Delim::Open(Pair::Brace)));
    }

    #[test]
    fn line_comment_hides_rest_of_line() {
        let scanned = scan_line("x = 1; // { not code", LexState::new());
        assert_eq!(scanned.code, "x = 1; ");
        assert!(scanned.has_comment);
        assert_eq!(scanned.marks.len(), 1);
    }

    #[test]
    fn comment_markers_inside_strings_are_code() {
        let scanned = scan_line(r#"s = "//"; {"#, LexState::new());
        assert!(!scanned.has_comment);
        assert_eq!(scanned.last(Delim::Open(Pair::Brace)), Some(10));
    }

    #[test]
    fn block_comment_spanning_lines_carries_state() {
        let first = scan_line("a; /* {", LexState::new());
        assert!(first.exit.in_block_comment);
        assert_eq!(first.code.trim(), "a;");

        let middle = scan_line("  } } }", first.exit);
        assert!(middle.marks.is_empty());
        assert!(middle.is_code_blank());
        assert!(middle.exit.in_block_comment);

        let last = scan_line("*/ {", middle.exit);
        assert!(!last.exit.in_block_comment);
        assert_eq!(last.first(Delim::Open(Pair::Brace)), Some(3));
    }

    #[test]
    fn inline_block_comment_leaves_code_on_both_sides() {
        let scanned = scan_line("a /* } */ b", LexState::new());
        assert_eq!(scanned.code, "a   b");
        assert!(scanned.marks.is_empty());
        assert!(!scanned.exit.in_block_comment);
    }

    #[test]
    fn unterminated_string_is_not_carried() {
        let first = scan_line(r#"s = "{ unterminated"#, LexState::new());
        assert!(first.marks.is_empty());
        assert_eq!(first.exit, LexState::new());
    }

    #[test]
    fn balance_reports_closing_offset() {
        let scanned = scan_line("f(a, (b)) x", LexState::new());
        let mut depth = 0;
        assert_eq!(scanned.balance(Pair::Paren, &mut depth), Some(8));
        assert_eq!(depth, 0);
    }

    #[test]
    fn balance_carries_depth_between_lines() {
        let mut depth = 0;
        assert_eq!(scan_line("{ {", LexState::new()).balance(Pair::Brace, &mut depth), None);
        assert_eq!(depth, 2);
        assert_eq!(scan_line("} x }", LexState::new()).balance(Pair::Brace, &mut depth), Some(4));
    }

    #[test]
    fn scan_lines_threads_state() {
        let lines = ["/* a", "{", "*/ {"];
        let scanned: Vec<_> = scan_lines(lines, LexState::new()).collect();
        assert!(scanned[1].marks.is_empty());
        assert_eq!(scanned[2].net(Pair::Brace), 1);
    }

    #[test]
    fn multibyte_text_keeps_offsets_valid() {
        let line = "s = \"»»\"; {";
        let scanned = scan_line(line, LexState::new());
        let offset = scanned.last(Delim::Open(Pair::Brace)).unwrap();
        assert_eq!(&line[offset..], "{");
    }
}
