use alloc::string::String;
use core::fmt;

use crate::uri::UriResolver;

/// Generates `with_*` builders and getters for plain config fields.
macro_rules! config_fields {
    ($ty:ty { $($(#[$meta:meta])* $field:ident: $fty:ty => $with:ident;)* }) => {
        impl $ty {$(
            $(#[$meta])*
            #[inline]
            pub fn $field(&self) -> $fty {
                self.$field
            }

            #[inline]
            #[must_use]
            pub fn $with(mut self, $field: $fty) -> Self {
                self.$field = $field;
                self
            }
        )*}
    };
}

// -----------------------------------------------------------------------------
// RecursionPolicy

/// What a walker does when it meets a value already on its path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecursionPolicy {
    /// No cycle tracking. Only the depth limit stops an infinite walk.
    Off,
    /// Replace the repeated value with null and log a warning.
    #[default]
    Detect,
    /// Replace the repeated value with null silently.
    Ignore,
    /// Abort with [`RecursionError::Cycle`](crate::RecursionError::Cycle).
    Fail,
}

impl RecursionPolicy {
    #[inline]
    pub const fn tracks_cycles(self) -> bool {
        !matches!(self, Self::Off)
    }
}

// -----------------------------------------------------------------------------
// TraverseConfig

/// Settings shared by everything that walks an object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraverseConfig {
    recursion: RecursionPolicy,
    max_depth: usize,
    initial_depth: usize,
}

impl TraverseConfig {
    pub const DEFAULT: Self = Self {
        recursion: RecursionPolicy::Detect,
        max_depth: 100,
        initial_depth: 0,
    };
}

impl Default for TraverseConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

config_fields!(TraverseConfig {
    recursion: RecursionPolicy => with_recursion;
    /// The deepest nesting a walk may reach.
    max_depth: usize => with_max_depth;
    /// Indentation level of the root value.
    initial_depth: usize => with_initial_depth;
});

// -----------------------------------------------------------------------------
// SerializerConfig

/// Serializer settings.
///
/// Defaults produce compact output that keeps every non-null property.
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    traverse: TraverseConfig,
    use_whitespace: bool,
    max_indent: usize,
    quote_char: char,
    escape_solidus: bool,
    simple_mode: bool,
    trim_strings: bool,
    trim_null_properties: bool,
    trim_empty_collections: bool,
    trim_empty_maps: bool,
    sort_collections: bool,
    sort_maps: bool,
    add_bean_types: bool,
    add_root_type: bool,
    uri_resolver: UriResolver,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            traverse: TraverseConfig::DEFAULT,
            use_whitespace: false,
            max_indent: 100,
            quote_char: '"',
            escape_solidus: false,
            simple_mode: false,
            trim_strings: false,
            trim_null_properties: true,
            trim_empty_collections: false,
            trim_empty_maps: false,
            sort_collections: false,
            sort_maps: false,
            add_bean_types: false,
            add_root_type: false,
            uri_resolver: UriResolver::default(),
        }
    }
}

impl SerializerConfig {
    #[inline]
    pub fn traverse(&self) -> &TraverseConfig {
        &self.traverse
    }

    #[must_use]
    pub fn with_traverse(mut self, traverse: TraverseConfig) -> Self {
        self.traverse = traverse;
        self
    }

    #[inline]
    pub fn uri_resolver(&self) -> &UriResolver {
        &self.uri_resolver
    }

    #[must_use]
    pub fn with_uri_resolver(mut self, uri_resolver: UriResolver) -> Self {
        self.uri_resolver = uri_resolver;
        self
    }
}

config_fields!(SerializerConfig {
    /// Newlines and tabs between entries.
    use_whitespace: bool => with_use_whitespace;
    /// Nesting level past which whitespace is no longer added.
    max_indent: usize => with_max_indent;
    quote_char: char => with_quote_char;
    /// Escape `/` as `\/`.
    escape_solidus: bool => with_escape_solidus;
    /// Leave attribute names unquoted when the format allows it.
    simple_mode: bool => with_simple_mode;
    trim_strings: bool => with_trim_strings;
    /// Skip bean properties whose value is null.
    trim_null_properties: bool => with_trim_null_properties;
    trim_empty_collections: bool => with_trim_empty_collections;
    trim_empty_maps: bool => with_trim_empty_maps;
    sort_collections: bool => with_sort_collections;
    sort_maps: bool => with_sort_maps;
    /// Emit a type discriminator on beans whose runtime type differs from
    /// the declared type.
    add_bean_types: bool => with_add_bean_types;
    /// Emit a type discriminator on the root bean.
    add_root_type: bool => with_add_root_type;
});

// -----------------------------------------------------------------------------
// Charset

/// Text encodings accepted for byte and file input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl Charset {
    /// Decodes `bytes`, dropping a leading byte order mark.
    ///
    /// Returns `None` if the bytes are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                core::str::from_utf8(bytes).ok().map(String::from)
            }
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let text: String = char::decode_utf16(units).collect::<Result<_, _>>().ok()?;
    Some(match text.strip_prefix('\u{FEFF}') {
        Some(rest) => String::from(rest),
        None => text,
    })
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Latin1 => "ISO-8859-1",
        })
    }
}

// -----------------------------------------------------------------------------
// ParserConfig

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    strict: bool,
    trim_strings: bool,
    max_depth: usize,
    debug_output_lines: usize,
    stream_charset: Charset,
    file_charset: Charset,
}

impl ParserConfig {
    pub const DEFAULT: Self = Self {
        strict: false,
        trim_strings: false,
        max_depth: 128,
        debug_output_lines: 5,
        stream_charset: Charset::Utf8,
        file_charset: Charset::Utf8,
    };
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

config_fields!(ParserConfig {
    /// Reject input that lax mode tolerates: unquoted or single-quoted
    /// strings, comments, malformed numbers.
    strict: bool => with_strict;
    trim_strings: bool => with_trim_strings;
    /// The deepest nesting a parse may reach before failing with
    /// [`ParseErrorKind::DepthTooDeep`](crate::ParseErrorKind::DepthTooDeep).
    max_depth: usize => with_max_depth;
    /// Input lines shown around a parse error; 0 disables the snippet.
    debug_output_lines: usize => with_debug_output_lines;
    stream_charset: Charset => with_stream_charset;
    file_charset: Charset => with_file_charset;
});

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{Charset, ParserConfig, RecursionPolicy, SerializerConfig, TraverseConfig};

    #[test]
    fn defaults() {
        let traverse = TraverseConfig::default();
        assert_eq!(traverse.recursion(), RecursionPolicy::Detect);
        assert_eq!(traverse.max_depth(), 100);

        let ser = SerializerConfig::default();
        assert!(ser.trim_null_properties());
        assert!(!ser.use_whitespace());
        assert_eq!(ser.quote_char(), '"');

        let parser = ParserConfig::default();
        assert_eq!(parser.max_depth(), 128);
        assert_eq!(parser.debug_output_lines(), 5);
        assert!(!parser.strict());
    }

    #[test]
    fn builders_chain() {
        let config = SerializerConfig::default()
            .with_use_whitespace(true)
            .with_quote_char('\'')
            .with_traverse(TraverseConfig::default().with_max_depth(3));
        assert!(config.use_whitespace());
        assert_eq!(config.quote_char(), '\'');
        assert_eq!(config.traverse().max_depth(), 3);
    }

    #[test]
    fn charsets_decode() {
        assert_eq!(Charset::Utf8.decode(b"\xEF\xBB\xBFabc").as_deref(), Some("abc"));
        assert_eq!(Charset::Utf8.decode(b"\xFF"), None);
        assert_eq!(Charset::Utf16Le.decode(b"\xFF\xFEa\x00b\x00").as_deref(), Some("ab"));
        assert_eq!(Charset::Utf16Be.decode(b"\x00a\x00b").as_deref(), Some("ab"));
        assert_eq!(Charset::Utf16Be.decode(b"\x00"), None);
        assert_eq!(Charset::Latin1.decode(b"caf\xE9").as_deref(), Some("café"));
        assert_eq!(Charset::Utf16Le.to_string(), "UTF-16LE");
    }
}
