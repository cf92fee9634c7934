use alloc::boxed::Box;
use alloc::string::String;
use core::error::Error;
use core::fmt;
use std::io;

use marshal_reflect::PropertyError;
use marshal_reflect::convert::ConvertError;
use marshal_reflect::swap::SwapError;
use thiserror::Error;

use crate::config::Charset;

// -----------------------------------------------------------------------------
// RecursionError

/// A walk went too deep, or met a cycle under [`RecursionPolicy::Fail`].
///
/// `stack` renders the frames from the root down to the failing value.
///
/// [`RecursionPolicy::Fail`]: crate::RecursionPolicy::Fail
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecursionError {
    #[error("Recursion occurred, stack={stack}")]
    Cycle { stack: String },
    #[error("Depth too deep. Maximum depth of {max_depth} exceeded, stack={stack}")]
    DepthExceeded { max_depth: usize, stack: String },
}

// -----------------------------------------------------------------------------
// SerializeError

/// Failure of a serialize call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    #[error("I/O error while serializing")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Recursion(#[from] RecursionError),
    #[error("Could not call getter on property '{property}' of class '{class}'")]
    Getter {
        property: String,
        class: String,
        #[source]
        source: PropertyError,
    },
    #[error("Could not swap value of class '{class}'")]
    Swap {
        class: String,
        #[source]
        source: SwapError,
    },
    /// A map key with no text form: a container, bean or stream.
    #[error("Map key of kind '{0}' cannot be written as an attribute name")]
    UnsupportedKey(&'static str),
}

// -----------------------------------------------------------------------------
// ParseErrorKind

/// What went wrong while parsing.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Malformed or unexpected input.
    #[error("{0}")]
    Syntax(String),
    #[error("Unknown property '{property}' encountered while trying to parse into class '{class}'")]
    UnknownProperty { property: String, class: String },
    #[error("Unresolvable type name '{name}' for class '{class}'")]
    UnresolvedTypeName { name: String, class: String },
    #[error("Class '{0}' could not be instantiated")]
    NotInstantiable(String),
    #[error("Could not set property '{property}' on class '{class}'")]
    Setter { property: String, class: String },
    #[error("{0}")]
    Convert(ConvertError),
    #[error("{0}")]
    Swap(SwapError),
    /// Nesting exceeded the parser's maximum depth.
    #[error("Depth too deep.  Stack overflow occurred.")]
    DepthTooDeep,
    #[error("I/O error while reading input")]
    Io,
    #[error("Input could not be decoded as {0}")]
    Decode(Charset),
    /// The parser does not implement the requested operation.
    #[error("Parser '{parser}' does not support {operation}")]
    Unsupported {
        parser: &'static str,
        operation: &'static str,
    },
}

// -----------------------------------------------------------------------------
// ParseLocation

/// Where in the input, and where in the target type, a parse failed.
///
/// `line` and `column` are 1-based; a `line` of 0 means the failure is
/// not tied to a position (for example, unreadable input).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseLocation {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub current_class: Option<String>,
    pub current_property: Option<String>,
    /// Numbered input lines around the failure, when input caching is on.
    pub snippet: Option<String>,
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, " at line {}, column {}", self.line, self.column)?;
        }
        if let Some(class) = &self.current_class {
            write!(f, ", currentClass='{class}'")?;
        }
        if let Some(property) = &self.current_property {
            write!(f, ", currentProperty='{property}'")?;
        }
        if let Some(snippet) = &self.snippet {
            write!(f, "\n{snippet}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ParseError

/// Failure of a parse call: a [`ParseErrorKind`], its [`ParseLocation`]
/// and, optionally, the underlying cause.
#[derive(Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
    location: ParseLocation,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: ParseLocation) -> Self {
        Self {
            kind,
            location,
            source: None,
        }
    }

    /// An error not tied to an input position.
    pub fn unlocated(kind: ParseErrorKind) -> Self {
        Self::new(kind, ParseLocation::default())
    }

    pub fn unsupported(parser: &'static str, operation: &'static str) -> Self {
        Self::unlocated(ParseErrorKind::Unsupported { parser, operation })
    }

    pub fn io(error: io::Error) -> Self {
        Self::unlocated(ParseErrorKind::Io).with_source(error)
    }

    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    #[inline]
    pub fn location(&self) -> &ParseLocation {
        &self.location
    }

    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Unsupported { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.location)
    }
}

impl From<io::Error> for ParseError {
    fn from(error: io::Error) -> Self {
        Self::io(error)
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::error::Error;
    use std::io;

    use super::{ParseError, ParseErrorKind, ParseLocation};

    #[test]
    fn display_includes_location() {
        let location = ParseLocation {
            offset: 12,
            line: 2,
            column: 5,
            current_class: Some("Person".into()),
            current_property: Some("age".into()),
            snippet: None,
        };
        let err = ParseError::new(ParseErrorKind::Syntax("Unexpected '}'".into()), location);
        assert_eq!(
            err.to_string(),
            "Unexpected '}' at line 2, column 5, currentClass='Person', currentProperty='age'"
        );
    }

    #[test]
    fn unlocated_errors_have_no_position() {
        let err = ParseError::unsupported("json", "parse_into_map");
        assert!(err.is_unsupported());
        assert_eq!(err.to_string(), "Parser 'json' does not support parse_into_map");
    }

    #[test]
    fn io_cause_is_the_source() {
        let err = ParseError::io(io::Error::other("disk gone"));
        assert_eq!(err.kind(), &ParseErrorKind::Io);
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk gone"));
    }
}
