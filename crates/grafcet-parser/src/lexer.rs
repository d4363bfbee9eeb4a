//! Line splitting for chart source text.
//!
//! The chart language is line oriented: each non-blank line holds exactly one
//! directive. [`lines`] cuts the source into trimmed [`Line`]s, drops `//`
//! comments (outside string literals) and remembers where every line sits in
//! the original text so later phases can point diagnostics at it.

use crate::span::Span;

/// One directive line with comments and surrounding whitespace removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    text: &'a str,
    span: Span,
    number: usize,
}

impl<'a> Line<'a> {
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Absolute span of the trimmed text.
    pub fn span(&self) -> Span {
        self.span
    }

    /// 1-based line number.
    pub fn number(&self) -> usize {
        self.number
    }
}

/// Splits `source` into directive lines, skipping blanks and comment-only lines.
pub(crate) fn lines(source: &str) -> Vec<Line<'_>> {
    let mut result = Vec::new();
    let mut offset = 0;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw.len();

        let content = raw.trim_end_matches(['\n', '\r']);
        let content = &content[..comment_start(content)];

        let trimmed_start = content.trim_start();
        let leading = content.len() - trimmed_start.len();
        let text = trimmed_start.trim_end();
        if text.is_empty() {
            continue;
        }

        let start = line_start + leading;
        result.push(Line {
            text,
            span: Span::new(start..start + text.len()),
            number: index + 1,
        });
    }

    result
}

/// Byte offset of a `//` comment outside double quotes, or the line length.
fn comment_start(line: &str) -> usize {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => return i,
            _ => {}
        }
        i += 1;
    }

    line.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_blank_and_comments() {
        let source = "SFC \"Demo\"\n\n// header comment\n  Step 0 (Initial)  \n";
        let lines = lines(source);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "SFC \"Demo\"");
        assert_eq!(lines[0].number(), 1);
        assert_eq!(lines[1].text(), "Step 0 (Initial)");
        assert_eq!(lines[1].number(), 4);
    }

    #[test]
    fn test_line_span_points_into_source() {
        let source = "Step 0\r\n    Transition START\r\n";
        let lines = lines(source);

        let span = lines[1].span();
        assert_eq!(&source[span.start()..span.end()], "Transition START");
    }

    #[test]
    fn test_trailing_comment_is_removed() {
        let lines = lines("Transition A AND B // wait for both");
        assert_eq!(lines[0].text(), "Transition A AND B");
    }

    #[test]
    fn test_comment_marker_inside_string_is_kept() {
        let lines = lines("LinkedFile \"http://plant/fill.sfc\"");
        assert_eq!(lines[0].text(), "LinkedFile \"http://plant/fill.sfc\"");
    }

    #[test]
    fn test_missing_final_newline() {
        let lines = lines("Step 0\nStep 1");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text(), "Step 1");
    }
}
