//! Runtime type descriptors.
//!
//! - [`TypeKind`]: the category of a type, which decides how a value of
//!   that type is walked and parsed.
//! - [`TypeHandle`]: a cheap, shared descriptor for one type.

// -----------------------------------------------------------------------------
// Modules

mod type_handle;

// -----------------------------------------------------------------------------
// Exports

pub use type_handle::{FromStringFn, TypeHandle};

use core::fmt;

// -----------------------------------------------------------------------------
// TypeKind

/// The category of a [`TypeHandle`].
///
/// `Any` is the unknown type: parsers infer a concrete value from the
/// input, serializers use the runtime type of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Any,
    Void,
    Bool,
    Integer,
    Float,
    Char,
    String,
    Uri,
    Map,
    Collection,
    Array,
    Bean,
    Stream,
    Object,
}

impl TypeKind {
    /// Returns `true` for `Integer` and `Float`.
    #[inline]
    pub const fn is_number(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns `true` for `Collection` and `Array`.
    #[inline]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::Collection | Self::Array)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.pad("Any"),
            Self::Void => f.pad("Void"),
            Self::Bool => f.pad("Bool"),
            Self::Integer => f.pad("Integer"),
            Self::Float => f.pad("Float"),
            Self::Char => f.pad("Char"),
            Self::String => f.pad("String"),
            Self::Uri => f.pad("Uri"),
            Self::Map => f.pad("Map"),
            Self::Collection => f.pad("Collection"),
            Self::Array => f.pad("Array"),
            Self::Bean => f.pad("Bean"),
            Self::Stream => f.pad("Stream"),
            Self::Object => f.pad("Object"),
        }
    }
}
