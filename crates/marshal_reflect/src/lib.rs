//! The dynamic object model shared by every format.
//!
//! ## Menu
//!
//! - [`Value`]: a node of an object graph. Containers, beans and opaque
//!   objects are shared handles, so a graph may contain cycles.
//! - [`TypeHandle`]: runtime type descriptor, one of the [`TypeKind`]s,
//!   optionally carrying a bean description, a type dictionary and a
//!   wrapper attribute.
//! - [`Bean`]: introspectable record with named, typed properties.
//! - [`Swap`](swap::Swap): a per-type transform applied before
//!   serialization and reversed after parsing.

// -----------------------------------------------------------------------------
// Allocation

// Paths are written against `core` and `alloc` where possible; `std`
// supplies locks and I/O.
extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod bean;
pub mod convert;
pub mod info;
pub mod swap;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use bean::{Bean, BeanDictionary, BeanMeta, BeanRef, PropertyError, PropertyMeta};
pub use info::{TypeHandle, TypeKind};
pub use value::{ListRef, MapRef, Number, Object, ObjectRef, StreamRef, Value};
