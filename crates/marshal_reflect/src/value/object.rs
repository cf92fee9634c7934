use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::ops::Deref;

use crate::info::TypeHandle;

// -----------------------------------------------------------------------------
// Object

/// An opaque value with a string form.
///
/// Objects are not introspected. Without a swap they serialize as
/// their [`to_text`](Object::to_text), and parse through the
/// [`from_string`](TypeHandle::from_string) of their type handle.
pub trait Object: Any + Send + Sync + fmt::Debug {
    fn type_handle(&self) -> TypeHandle;

    fn to_text(&self) -> String;
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared handle to an [`Object`].
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Object>);

impl ObjectRef {
    pub fn new<T: Object>(object: T) -> Self {
        Self(Arc::new(object))
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }

    /// Returns the concrete object if it is a `T`.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        let any: &dyn Any = &*self.0;
        any.downcast_ref()
    }
}

impl Deref for ObjectRef {
    type Target = dyn Object;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
