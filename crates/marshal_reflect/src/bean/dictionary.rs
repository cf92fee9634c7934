use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use marshal_utils::hash::HashMap;

use crate::info::TypeHandle;

// -----------------------------------------------------------------------------
// BeanDictionary

#[derive(Clone, Default)]
struct DictionaryData {
    by_name: HashMap<Cow<'static, str>, TypeHandle>,
    names: Vec<(TypeHandle, Cow<'static, str>)>,
}

/// A name to type mapping used for type discriminators.
///
/// Serializers look up the name of a value's runtime type, parsers look
/// up the type named by a discriminator. Dictionaries are immutable once
/// shared; [`with`](Self::with) returns an extended copy.
///
/// # Examples
///
/// ```
/// use marshal_reflect::{BeanDictionary, TypeHandle};
///
/// let shape = TypeHandle::abstract_bean("Shape");
/// let dict = BeanDictionary::new().with("shape", shape.clone());
///
/// assert_eq!(dict.get("shape"), Some(&shape));
/// assert_eq!(dict.name_of(&shape), Some("shape"));
/// ```
#[derive(Clone, Default)]
pub struct BeanDictionary(Arc<DictionaryData>);

impl BeanDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `name` bound to `ty`. A rebound name keeps
    /// only its latest type.
    pub fn with(self, name: impl Into<Cow<'static, str>>, ty: TypeHandle) -> Self {
        let name = name.into();
        let mut data = Arc::unwrap_or_clone(self.0);
        data.names.retain(|(_, bound)| *bound != name);
        data.by_name.insert(name.clone(), ty.clone());
        data.names.push((ty, name));
        Self(Arc::new(data))
    }

    /// The type bound to `name`.
    pub fn get(&self, name: &str) -> Option<&TypeHandle> {
        self.0.by_name.get(name)
    }

    /// The first name bound to `ty`.
    pub fn name_of(&self, ty: &TypeHandle) -> Option<&str> {
        self.0
            .names
            .iter()
            .find(|(bound, _)| bound == ty)
            .map(|(_, name)| name.as_ref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.names.is_empty()
    }
}

impl fmt::Debug for BeanDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.names.iter().map(|(ty, name)| (name, ty)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
