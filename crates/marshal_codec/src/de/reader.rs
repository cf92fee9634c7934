use alloc::string::String;
use core::fmt::Write as _;

/// A character cursor over decoded parser input.
///
/// Positions are byte offsets into the input; line and column numbers
/// are computed on demand for error reporting.
#[derive(Debug, Clone)]
pub struct ParserReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ParserReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The next character, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// The character after [`peek`](Self::peek).
    pub fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Consumes and returns the next character.
    #[inline]
    #[expect(clippy::should_implement_trait, reason = "a cursor, not an iterator")]
    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes the next character if it is `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes `literal` if the input continues with it.
    pub fn eat_str(&mut self, literal: &str) -> bool {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `pred` holds, returning them.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// 1-based line and column of a byte offset.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let offset = floor_char_boundary(self.input, offset);
        let before = &self.input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    /// Numbered input lines within `radius` lines of `line`, the failing
    /// line marked with `*`.
    pub fn snippet(&self, line: usize, radius: usize) -> String {
        let first = line.saturating_sub(radius).max(1);
        let last = line + radius;
        let mut out = String::new();
        for (n, text) in self.input.lines().enumerate().map(|(i, text)| (i + 1, text)) {
            if n < first {
                continue;
            }
            if n > last {
                break;
            }
            let marker = if n == line { '*' } else { ' ' };
            let _ = writeln!(out, "{marker}{n:>5}: {text}");
        }
        out
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ParserReader;

    #[test]
    fn cursor_moves_by_chars() {
        let mut r = ParserReader::new("é1");
        assert_eq!(r.peek_second(), Some('1'));
        assert_eq!(r.next(), Some('é'));
        assert_eq!(r.position(), 2);
        assert!(r.eat('1'));
        assert!(r.is_eof());
        assert_eq!(r.next(), None);
    }

    #[test]
    fn take_while_and_eat_str() {
        let mut r = ParserReader::new("abc123 true");
        assert_eq!(r.take_while(char::is_alphabetic), "abc");
        assert_eq!(r.take_while(|c| c.is_ascii_digit()), "123");
        assert!(!r.eat_str("true"));
        assert!(r.eat(' '));
        assert!(r.eat_str("true"));
    }

    #[test]
    fn line_and_column() {
        let r = ParserReader::new("ab\ncd\nef");
        assert_eq!(r.line_column(0), (1, 1));
        assert_eq!(r.line_column(4), (2, 2));
        assert_eq!(r.line_column(100), (3, 3));
    }

    #[test]
    fn snippet_marks_line() {
        let r = ParserReader::new("a\nb\nc\nd");
        assert_eq!(r.snippet(2, 1), "     1: a\n*    2: b\n     3: c\n");
    }
}
