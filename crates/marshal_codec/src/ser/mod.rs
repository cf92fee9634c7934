//! Serialization: the object-graph walker and the handler trait.
//!
//! A [`Serializer`] is a stateless, shareable handler. Each call creates a
//! [`SerializerSession`] that walks the value and emits it through a
//! format-specific [`TreeWriter`].

// -----------------------------------------------------------------------------
// Modules

mod session;

// -----------------------------------------------------------------------------
// Exports

pub use session::SerializerSession;

use alloc::string::String;
use alloc::vec::Vec;
use std::io;

use marshal_reflect::{TypeHandle, Value};

use crate::error::SerializeError;
use crate::media::MediaTypeHandler;

// -----------------------------------------------------------------------------
// TreeWriter

/// Format-specific output primitives used by [`SerializerSession`].
///
/// `depth` arguments are the current indentation level; writers that do
/// not indent ignore them.
pub trait TreeWriter {
    /// The null literal.
    fn null(&mut self) -> io::Result<()>;

    /// An unquoted scalar, such as a number or boolean.
    fn literal(&mut self, text: &str) -> io::Result<()>;

    /// A quoted, escaped string.
    fn string_value(&mut self, text: &str) -> io::Result<()>;

    /// A resolved URI. Written as a string unless the format has a
    /// dedicated notation.
    fn uri_value(&mut self, uri: &str) -> io::Result<()> {
        self.string_value(uri)
    }

    /// Pre-formatted content, copied verbatim.
    fn raw(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn object_start(&mut self) -> io::Result<()>;

    fn object_end(&mut self) -> io::Result<()>;

    fn array_start(&mut self) -> io::Result<()>;

    fn array_end(&mut self) -> io::Result<()>;

    /// Separates two entries of an object or array.
    fn entry_separator(&mut self, depth: usize) -> io::Result<()>;

    /// An attribute (object key) name.
    fn attr(&mut self, name: &str) -> io::Result<()>;

    /// Separates an attribute name from its value.
    fn key_separator(&mut self, depth: usize) -> io::Result<()>;

    /// Line break before an entry at `depth`.
    fn cr(&mut self, depth: usize) -> io::Result<()>;

    /// Line break before a closing delimiter at `depth`.
    fn cre(&mut self, depth: usize) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

// -----------------------------------------------------------------------------
// Serializer

/// A stateless serializer for one wire format.
///
/// Implementations are shared across threads; all per-call state lives in
/// the session they create for each call.
pub trait Serializer: MediaTypeHandler + Send + Sync {
    /// Serializes `value`, declared as `expected`, to `out`.
    ///
    /// `expected` drives container element types and type discriminators.
    /// `None` declares the root as its own runtime type.
    fn serialize_as(
        &self,
        value: &Value,
        expected: Option<&TypeHandle>,
        out: &mut dyn io::Write,
    ) -> Result<(), SerializeError>;

    fn serialize(&self, value: &Value, out: &mut dyn io::Write) -> Result<(), SerializeError> {
        self.serialize_as(value, None, out)
    }

    /// Serializes `value` to a string. Invalid UTF-8 from raw streams is
    /// replaced.
    fn serialize_to_string(&self, value: &Value) -> Result<String, SerializeError> {
        let mut buf = Vec::new();
        self.serialize(value, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
