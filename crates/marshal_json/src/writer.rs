use alloc::string::String;
use core::fmt::Write as _;
use std::io::{self, Write};

use marshal_codec::{SerializerConfig, TreeWriter};

/// JavaScript reserved words, sorted. Never written as bare attribute
/// names.
const RESERVED: &[&str] = &[
    "arguments", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally", "for",
    "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
];

/// Returns `true` if `name` can be written without quotes in simple mode.
fn is_bare_attr(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && RESERVED.binary_search(&name).is_err()
}

// -----------------------------------------------------------------------------
// JsonWriter

/// [`TreeWriter`] for JSON text.
///
/// Whitespace is tabs and newlines, added only while the nesting depth
/// is within the configured maximum indent; past it, entries are
/// separated by single spaces.
pub struct JsonWriter<W: Write> {
    out: W,
    quote: char,
    escape_solidus: bool,
    simple: bool,
    whitespace: bool,
    max_indent: usize,
    scratch: String,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W, config: &SerializerConfig) -> Self {
        Self {
            out,
            quote: config.quote_char(),
            escape_solidus: config.escape_solidus(),
            simple: config.simple_mode(),
            whitespace: config.use_whitespace(),
            max_indent: config.max_indent(),
            scratch: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn newline(&mut self, depth: usize) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        for _ in 0..depth {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }

    fn escape_into_scratch(&mut self, text: &str) {
        self.scratch.clear();
        self.scratch.push(self.quote);
        for c in text.chars() {
            match c {
                '\\' => self.scratch.push_str("\\\\"),
                '\n' => self.scratch.push_str("\\n"),
                '\r' => self.scratch.push_str("\\r"),
                '\t' => self.scratch.push_str("\\t"),
                '\u{8}' => self.scratch.push_str("\\b"),
                '\u{c}' => self.scratch.push_str("\\f"),
                '/' if self.escape_solidus => self.scratch.push_str("\\/"),
                c if c == self.quote => {
                    self.scratch.push('\\');
                    self.scratch.push(c);
                }
                c if c < ' ' => {
                    let _ = write!(self.scratch, "\\u{:04x}", u32::from(c));
                }
                c => self.scratch.push(c),
            }
        }
        self.scratch.push(self.quote);
    }
}

impl<W: Write> TreeWriter for JsonWriter<W> {
    fn null(&mut self) -> io::Result<()> {
        self.out.write_all(b"null")
    }

    fn literal(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn string_value(&mut self, text: &str) -> io::Result<()> {
        self.escape_into_scratch(text);
        self.out.write_all(self.scratch.as_bytes())
    }

    fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    fn object_start(&mut self) -> io::Result<()> {
        self.out.write_all(b"{")
    }

    fn object_end(&mut self) -> io::Result<()> {
        self.out.write_all(b"}")
    }

    fn array_start(&mut self) -> io::Result<()> {
        self.out.write_all(b"[")
    }

    fn array_end(&mut self) -> io::Result<()> {
        self.out.write_all(b"]")
    }

    fn entry_separator(&mut self, depth: usize) -> io::Result<()> {
        self.out.write_all(b",")?;
        if self.whitespace && depth > self.max_indent {
            self.out.write_all(b" ")?;
        }
        Ok(())
    }

    fn attr(&mut self, name: &str) -> io::Result<()> {
        if self.simple && is_bare_attr(name) {
            self.out.write_all(name.as_bytes())
        } else {
            self.string_value(name)
        }
    }

    fn key_separator(&mut self, _depth: usize) -> io::Result<()> {
        if self.whitespace {
            self.out.write_all(b": ")
        } else {
            self.out.write_all(b":")
        }
    }

    fn cr(&mut self, depth: usize) -> io::Result<()> {
        if self.whitespace && depth <= self.max_indent {
            self.newline(depth)?;
        }
        Ok(())
    }

    fn cre(&mut self, depth: usize) -> io::Result<()> {
        if self.whitespace && depth < self.max_indent {
            self.newline(depth)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use marshal_codec::{SerializerConfig, TreeWriter};

    use super::{JsonWriter, RESERVED, is_bare_attr};

    fn written(config: &SerializerConfig, f: impl FnOnce(&mut JsonWriter<Vec<u8>>)) -> String {
        let mut writer = JsonWriter::new(Vec::new(), config);
        f(&mut writer);
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn reserved_words_are_sorted() {
        assert!(RESERVED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn escapes() {
        let config = SerializerConfig::default();
        let out = written(&config, |w| w.string_value("a\"b\\c\n\u{1}/").unwrap());
        assert_eq!(out, r#""a\"b\\c\n\u0001/""#);

        let config = SerializerConfig::default()
            .with_quote_char('\'')
            .with_escape_solidus(true);
        let out = written(&config, |w| w.string_value("it's a/b \"x\"").unwrap());
        assert_eq!(out, r#"'it\'s a\/b "x"'"#);
    }

    #[test]
    fn simple_mode_attrs() {
        assert!(is_bare_attr("name_1"));
        assert!(is_bare_attr("$x"));
        assert!(!is_bare_attr("1st"));
        assert!(!is_bare_attr("a-b"));
        assert!(!is_bare_attr("class"));
        assert!(!is_bare_attr(""));

        let config = SerializerConfig::default().with_simple_mode(true);
        let out = written(&config, |w| {
            w.attr("name").unwrap();
            w.attr("default").unwrap();
        });
        assert_eq!(out, "name\"default\"");
    }

    #[test]
    fn whitespace_stops_at_max_indent() {
        let config = SerializerConfig::default()
            .with_use_whitespace(true)
            .with_max_indent(1);
        let out = written(&config, |w| {
            w.cr(1).unwrap();
            w.cr(2).unwrap();
            w.entry_separator(2).unwrap();
            w.cre(0).unwrap();
            w.cre(1).unwrap();
            w.key_separator(1).unwrap();
        });
        assert_eq!(out, "\n\t, \n: ");
    }
}
