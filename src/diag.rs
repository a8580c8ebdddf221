use std::fmt::{Display, Formatter, Result};

/// A position in source text. `offset` counts characters from the start of
/// the input; `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn origin() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Extends this span to the end of `other`. Assumes source order.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: Position::origin(),
            end: Position::origin(),
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Renders a recorded error as an annotated snippet: a `name (line:col)`
/// header, the source lines the span covers, and a caret marker under the
/// covered columns.
///
/// ```text
/// demo (3:19) Unknown trait: Tone
/// 3 | class C encodes (Tone) {
///   |                  ^^^^
/// ```
pub fn format_error(source: &str, source_name: &str, span: Span, error: impl Display) -> String {
    let first = span.start.line.max(1);
    let last = span.end.line.max(first);
    let gutter = last.to_string().len();

    let mut out = format!(
        "{source_name} ({}:{}) {error}\n",
        span.start.line, span.start.column
    );

    for (number, content) in source.lines().enumerate() {
        let number = number + 1;
        if number < first || number > last {
            continue;
        }
        out.push_str(&format!("{number:>gutter$} | {content}\n"));

        let from = if number == first {
            span.start.column.max(1)
        } else {
            1
        };
        let to = if number == last {
            span.end.column.max(from)
        } else {
            content.chars().count() + 1
        };
        if to > from {
            out.push_str(&format!(
                "{:>gutter$} | {}{}\n",
                "",
                " ".repeat(from - 1),
                "^".repeat(to - from)
            ));
        }
    }
    out
}
