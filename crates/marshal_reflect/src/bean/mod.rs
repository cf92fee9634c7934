//! Introspectable records.
//!
//! A [`Bean`] exposes its properties as an ordered list of
//! [`PropertyValue`]s and accepts assignments by property name. The
//! static shape of a bean type (property names, declared types and an
//! optional constructor) is described by a [`BeanMeta`] attached to the
//! bean's [`TypeHandle`].
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//! use marshal_reflect::bean::{Bean, BeanMeta, PropertyError, PropertyMeta, PropertyValue};
//! use marshal_reflect::{TypeHandle, TypeKind, Value};
//!
//! #[derive(Debug, Default)]
//! struct Point { x: i64, y: i64 }
//!
//! static POINT: LazyLock<TypeHandle> = LazyLock::new(|| {
//!     TypeHandle::bean::<Point>(
//!         BeanMeta::new("Point")
//!             .with_property(PropertyMeta::new("x", TypeHandle::integer()))
//!             .with_property(PropertyMeta::new("y", TypeHandle::integer()))
//!             .with_constructor(|| Box::new(Point::default())),
//!     )
//! });
//!
//! impl Bean for Point {
//!     fn type_handle(&self) -> TypeHandle {
//!         POINT.clone()
//!     }
//!
//!     fn properties(&self) -> Vec<PropertyValue> {
//!         POINT.property_values([Value::from(self.x), Value::from(self.y)])
//!     }
//!
//!     fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
//!         let slot = match name {
//!             "x" => &mut self.x,
//!             "y" => &mut self.y,
//!             _ => return Err(PropertyError::Unknown(name.into())),
//!         };
//!         *slot = value
//!             .as_i64()
//!             .ok_or_else(|| PropertyError::mismatch(name, TypeKind::Integer, &value))?;
//!         Ok(())
//!     }
//! }
//!
//! let mut point = Point::default();
//! point.set_property("y", Value::from(7)).unwrap();
//! assert_eq!(point.properties()[1].value, Ok(Value::from(7)));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod dictionary;
mod meta;

// -----------------------------------------------------------------------------
// Exports

pub use dictionary::BeanDictionary;
pub use meta::{BeanConstructor, BeanMeta, PropertyMeta, PropertyValue};

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::ops::Deref;

use thiserror::Error;

use crate::info::{TypeHandle, TypeKind};
use crate::value::Value;

// -----------------------------------------------------------------------------
// Bean

/// A record with named, typed properties.
pub trait Bean: Any + Send + Sync + fmt::Debug {
    /// The bean's type. Its [`BeanMeta`] lists the properties.
    fn type_handle(&self) -> TypeHandle;

    /// Current property values, in declaration order.
    ///
    /// A getter that fails reports an `Err` for its property only.
    fn properties(&self) -> Vec<PropertyValue>;

    /// Assigns a property by name.
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError>;
}

/// Failure reported by a bean getter or setter.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum PropertyError {
    #[error("{0}")]
    Getter(String),
    #[error("{0}")]
    Setter(String),
    #[error("property `{property}` expects {expected}, found {found}")]
    Mismatch {
        property: String,
        expected: TypeKind,
        found: &'static str,
    },
    #[error("no writable property named `{0}`")]
    Unknown(String),
}

impl PropertyError {
    pub fn getter(message: impl Into<String>) -> Self {
        Self::Getter(message.into())
    }

    pub fn setter(message: impl Into<String>) -> Self {
        Self::Setter(message.into())
    }

    pub fn mismatch(property: &str, expected: TypeKind, found: &Value) -> Self {
        Self::Mismatch {
            property: property.into(),
            expected,
            found: found.kind_name(),
        }
    }
}

// -----------------------------------------------------------------------------
// BeanRef

/// A shared handle to a bean.
///
/// Identity is the address of the shared allocation; clones of a
/// `BeanRef` have the same identity.
#[derive(Clone)]
pub struct BeanRef(Arc<dyn Bean>);

impl BeanRef {
    pub fn new<T: Bean>(bean: T) -> Self {
        Self(Arc::new(bean))
    }

    pub fn from_box(bean: Box<dyn Bean>) -> Self {
        Self(Arc::from(bean))
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }

    /// Returns the concrete bean if it is a `T`.
    pub fn downcast_ref<T: Bean>(&self) -> Option<&T> {
        let any: &dyn Any = &*self.0;
        any.downcast_ref()
    }
}

impl Deref for BeanRef {
    type Target = dyn Bean;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
