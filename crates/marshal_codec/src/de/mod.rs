//! Parsing: the handler trait, input decoding and the shared session.
//!
//! A [`Parser`] is a stateless, shareable handler. Each call decodes its
//! [`ParserInput`] to text and drives a format-specific grammar on top of
//! a [`ParserSession`], which owns the cursor, depth accounting, error
//! locations and the format-independent coercion rules.

// -----------------------------------------------------------------------------
// Modules

mod reader;
mod session;

// -----------------------------------------------------------------------------
// Exports

pub use reader::ParserReader;
pub use session::ParserSession;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use std::io::Read;
use std::path::Path;

use marshal_reflect::{ListRef, MapRef, TypeHandle, TypeKind, Value};

use crate::config::{Charset, ParserConfig};
use crate::error::{ParseError, ParseErrorKind};
use crate::media::MediaTypeHandler;

// -----------------------------------------------------------------------------
// ParserInput

/// The source of a parse call.
pub enum ParserInput<'a> {
    /// No input; parses as null.
    None,
    Str(&'a str),
    /// Bytes in the parser's stream charset.
    Bytes(&'a [u8]),
    /// A byte stream in the parser's stream charset, read to the end.
    Reader(&'a mut dyn Read),
    /// A file in the parser's file charset.
    File(&'a Path),
}

impl<'a> ParserInput<'a> {
    /// Decodes the input to text. `None` input yields `None`.
    pub fn read_text(self, config: &ParserConfig) -> Result<Option<Cow<'a, str>>, ParseError> {
        let (bytes, charset) = match self {
            Self::None => return Ok(None),
            Self::Str(text) => return Ok(Some(Cow::Borrowed(text))),
            Self::Bytes(bytes) => (Cow::Borrowed(bytes), config.stream_charset()),
            Self::Reader(reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).map_err(ParseError::io)?;
                (Cow::Owned(buf), config.stream_charset())
            }
            Self::File(path) => {
                let buf = std::fs::read(path).map_err(ParseError::io)?;
                (Cow::Owned(buf), config.file_charset())
            }
        };
        decode(&bytes, charset).map(|text| Some(Cow::Owned(text)))
    }
}

fn decode(bytes: &[u8], charset: Charset) -> Result<String, ParseError> {
    charset
        .decode(bytes)
        .ok_or_else(|| ParseError::unlocated(ParseErrorKind::Decode(charset)))
}

impl<'a> From<&'a str> for ParserInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Str(text)
    }
}

impl<'a> From<&'a String> for ParserInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Str(text)
    }
}

impl<'a> From<&'a [u8]> for ParserInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Path> for ParserInput<'a> {
    fn from(path: &'a Path) -> Self {
        Self::File(path)
    }
}

impl<'a, R: Read> From<&'a mut R> for ParserInput<'a> {
    fn from(reader: &'a mut R) -> Self {
        Self::Reader(reader)
    }
}

// -----------------------------------------------------------------------------
// Parser

/// A stateless parser for one wire format.
pub trait Parser: MediaTypeHandler + Send + Sync {
    /// Short format name, used in error messages.
    fn name(&self) -> &'static str;

    /// Parses `input` into a value of type `ty`. The target type is known
    /// not to be `Void`.
    fn parse_value(&self, input: ParserInput<'_>, ty: &TypeHandle) -> Result<Value, ParseError>;

    /// Parses `input` into a value of type `ty`.
    ///
    /// A `Void` target yields null without reading the input.
    fn parse(&self, input: ParserInput<'_>, ty: &TypeHandle) -> Result<Value, ParseError> {
        if ty.kind() == TypeKind::Void {
            return Ok(Value::Null);
        }
        self.parse_value(input, ty)
    }

    /// Parses an object into an existing map, returning it.
    fn parse_into_map(
        &self,
        input: ParserInput<'_>,
        map: &MapRef,
        key: &TypeHandle,
        value: &TypeHandle,
    ) -> Result<MapRef, ParseError> {
        let _ = (input, map, key, value);
        Err(ParseError::unsupported(self.name(), "parse_into_map"))
    }

    /// Parses an array into an existing collection, returning it.
    fn parse_into_collection(
        &self,
        input: ParserInput<'_>,
        list: &ListRef,
        element: &TypeHandle,
    ) -> Result<ListRef, ParseError> {
        let _ = (input, list, element);
        Err(ParseError::unsupported(self.name(), "parse_into_collection"))
    }
}

// -----------------------------------------------------------------------------
// Tests
