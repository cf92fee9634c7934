//! Small shared containers used across the marshalling crates.
//!
//! - [`hash`]: `hashbrown` containers with fixed, reproducible hashing.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId).
//! - [`IdentitySet`]: a set of object addresses, used to detect cycles.
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod identity;
mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use identity::IdentitySet;
pub use typeid_map::TypeIdMap;
