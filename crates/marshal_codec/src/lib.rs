//! Format-independent marshalling machinery.
//!
//! ## Menu
//!
//! - [`ser`]: the object-graph walker ([`SerializerSession`]) that emits a
//!   [`Value`](marshal_reflect::Value) through a [`TreeWriter`], and the
//!   [`Serializer`] handler trait.
//! - [`de`]: the [`Parser`] handler trait, parser input decoding and the
//!   [`ParserSession`] shared by format parsers (coercion, discriminator
//!   casting, unknown-property policy, error locations).
//! - [`media`]: media types and the [`FormatMatcher`] that dispatches a
//!   `Content-Type`/`Accept` header to a registered handler.
//! - [`RecursionGuard`]: cycle detection and depth limits for a walk.
//! - Configuration: [`TraverseConfig`], [`SerializerConfig`],
//!   [`ParserConfig`] and the shared [`BeanContext`].

// -----------------------------------------------------------------------------
// Allocation

// Paths are written against `core` and `alloc` where possible; `std`
// supplies locks and I/O.
extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod config;
mod context;
mod error;
mod listener;
mod recursion;
mod uri;

pub mod de;
pub mod media;
pub mod ser;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use config::{Charset, ParserConfig, RecursionPolicy, SerializerConfig, TraverseConfig};
pub use context::BeanContext;
pub use error::{ParseError, ParseErrorKind, ParseLocation, RecursionError, SerializeError};
pub use listener::{ParserListener, SerializerListener};
pub use recursion::{Guarded, RecursionGuard};
pub use uri::{UriContext, UriResolution, UriResolver};

pub use de::{Parser, ParserInput, ParserSession};
pub use media::{FormatMatch, FormatMatcher, MediaRange, MediaType, MediaTypeHandler};
pub use media::{ParserGroup, SerializerGroup};
pub use ser::{Serializer, SerializerSession, TreeWriter};
