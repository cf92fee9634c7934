//! Per-type transforms applied around serialization.
//!
//! A [`Swap`] replaces a value of its type with a stand-in of the
//! [`swapped_type`](Swap::swapped_type) before it is walked, and turns a
//! parsed stand-in back into the original type. Swaps are looked up by
//! the Rust type behind a bean or object handle.

// -----------------------------------------------------------------------------
// Modules

mod temporal;

// -----------------------------------------------------------------------------
// Exports

pub use temporal::{DurationMillisSwap, EpochMillisSwap, duration_type, system_time_type};

use alloc::string::String;
use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use std::time::{Duration, SystemTime};

use marshal_utils::TypeIdMap;
use thiserror::Error;

use crate::info::TypeHandle;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Swap

/// A reversible transform for values of one type.
pub trait Swap: Send + Sync + 'static {
    /// The type of the stand-in. `Any` means "whatever
    /// [`swap`](Self::swap) returns".
    fn swapped_type(&self) -> TypeHandle;

    fn swap(&self, value: &Value) -> Result<Value, SwapError>;

    /// Rebuilds a value of type `target` from a parsed stand-in.
    fn unswap(&self, value: &Value, target: &TypeHandle) -> Result<Value, SwapError>;
}

/// Failure of a [`Swap`].
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum SwapError {
    #[error("`{swap}` cannot swap a {found}")]
    Unexpected { swap: &'static str, found: &'static str },
    #[error("cannot unswap into `{target}`: {reason}")]
    Unswap { target: String, reason: String },
}

// -----------------------------------------------------------------------------
// SwapRegistry

/// Swaps keyed by the Rust type they apply to.
///
/// [`SwapRegistry::new`] (and `Default`) comes with the built-in
/// timestamp and duration swaps; [`SwapRegistry::empty`] has none.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
/// use marshal_reflect::swap::{SwapRegistry, system_time_type};
/// use marshal_reflect::TypeKind;
///
/// let swaps = SwapRegistry::new();
/// let swap = swaps.get(&system_time_type()).unwrap();
/// assert_eq!(swap.swapped_type().kind(), TypeKind::Integer);
///
/// assert!(SwapRegistry::empty().get_type::<SystemTime>().is_none());
/// ```
#[derive(Clone)]
pub struct SwapRegistry {
    swaps: TypeIdMap<Arc<dyn Swap>>,
}

impl SwapRegistry {
    pub fn empty() -> Self {
        Self {
            swaps: TypeIdMap::new(),
        }
    }

    pub fn new() -> Self {
        Self::empty()
            .with::<SystemTime>(EpochMillisSwap)
            .with::<Duration>(DurationMillisSwap)
    }

    /// Registers `swap` for values of type `T`, replacing any earlier one.
    pub fn register<T: 'static>(&mut self, swap: impl Swap) {
        self.swaps.insert(TypeId::of::<T>(), Arc::new(swap));
    }

    pub fn with<T: 'static>(mut self, swap: impl Swap) -> Self {
        self.register::<T>(swap);
        self
    }

    /// The swap for the Rust type behind `ty`.
    pub fn get(&self, ty: &TypeHandle) -> Option<&Arc<dyn Swap>> {
        ty.type_id().and_then(|id| self.swaps.get(&id))
    }

    pub fn get_type<T: 'static>(&self) -> Option<&Arc<dyn Swap>> {
        self.swaps.get_type::<T>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.swaps.len()
    }
}

impl Default for SwapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SwapRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapRegistry")
            .field("len", &self.swaps.len())
            .finish()
    }
}
