//! JSON serializer and parser.
//!
//! ## Menu
//!
//! - [`JsonSerializer`]: standard, readable and simplified (single
//!   quotes, bare attribute names) JSON output.
//! - [`JsonParser`]: a lax parser that tolerates comments, unquoted
//!   strings and loose numbers, and a strict one that accepts only
//!   standard JSON.
//! - [`JsonWriter`]: the [`TreeWriter`](marshal_codec::TreeWriter) both
//!   serializer flavours write through.

// -----------------------------------------------------------------------------
// Allocation

// Paths are written against `core` and `alloc` where possible; `std`
// supplies locks and I/O.
extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod parser;
mod serializer;
mod writer;

#[cfg(test)]
mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use parser::JsonParser;
pub use serializer::JsonSerializer;
pub use writer::JsonWriter;
