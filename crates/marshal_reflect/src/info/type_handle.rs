use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::LazyLock;

use crate::bean::{Bean, BeanDictionary, BeanMeta, PropertyError, PropertyValue};
use crate::info::TypeKind;
use crate::value::{Object, Value};

/// Builds a value of an opaque type from its string form.
///
/// The error is a human-readable reason, wrapped by the caller into a
/// conversion error that carries the input location.
pub type FromStringFn = fn(&str) -> Result<Value, String>;

// -----------------------------------------------------------------------------
// TypeData

#[derive(Clone)]
struct TypeData {
    kind: TypeKind,
    name: Cow<'static, str>,
    type_id: Option<TypeId>,
    key: Option<TypeHandle>,
    value: Option<TypeHandle>,
    element: Option<TypeHandle>,
    bean: Option<Arc<BeanMeta>>,
    dictionary: Option<BeanDictionary>,
    dictionary_name: Option<Cow<'static, str>>,
    wrapper_attr: Option<Cow<'static, str>>,
    from_string: Option<FromStringFn>,
}

impl TypeData {
    const fn new(kind: TypeKind, name: Cow<'static, str>) -> Self {
        Self {
            kind,
            name,
            type_id: None,
            key: None,
            value: None,
            element: None,
            bean: None,
            dictionary: None,
            dictionary_name: None,
            wrapper_attr: None,
            from_string: None,
        }
    }
}

// -----------------------------------------------------------------------------
// TypeHandle

/// A shared, immutable runtime type descriptor.
///
/// Cloning is a reference count increment. Builder methods such as
/// [`with_dictionary`](Self::with_dictionary) return a new handle and
/// leave other clones untouched.
///
/// Two handles are equal if they describe the same Rust type (for beans
/// and opaque objects), or have the same kind, name and parameters.
///
/// # Examples
///
/// ```
/// use marshal_reflect::{TypeHandle, TypeKind};
///
/// let ty = TypeHandle::map(TypeHandle::string(), TypeHandle::integer());
/// assert_eq!(ty.kind(), TypeKind::Map);
/// assert_eq!(ty.value_type(), TypeHandle::integer());
/// assert_eq!(ty.to_string(), "Map<String,Integer>");
/// ```
#[derive(Clone)]
pub struct TypeHandle(Arc<TypeData>);

macro_rules! shared_handles {
    ($($(#[$meta:meta])* $func:ident => $kind:ident;)*) => {$(
        $(#[$meta])*
        pub fn $func() -> Self {
            static HANDLE: LazyLock<TypeHandle> = LazyLock::new(|| {
                TypeHandle::from_data(TypeData::new(
                    TypeKind::$kind,
                    Cow::Borrowed(stringify!($kind)),
                ))
            });
            HANDLE.clone()
        }
    )*};
}

impl TypeHandle {
    #[inline]
    fn from_data(data: TypeData) -> Self {
        Self(Arc::new(data))
    }

    #[inline]
    fn modify(self, f: impl FnOnce(&mut TypeData)) -> Self {
        let mut data = Arc::unwrap_or_clone(self.0);
        f(&mut data);
        Self::from_data(data)
    }

    shared_handles! {
        /// The unknown type.
        any => Any;
        /// The "no value" type. Parsing into it yields null without
        /// reading the input.
        void => Void;
        bool => Bool;
        integer => Integer;
        float => Float;
        char => Char;
        string => String;
        uri => Uri;
        stream => Stream;
    }

    fn untyped(kind: TypeKind, name: &'static str) -> Self {
        Self::from_data(TypeData::new(kind, Cow::Borrowed(name)))
    }

    /// A map whose keys and values are of unknown type.
    pub fn untyped_map() -> Self {
        static HANDLE: LazyLock<TypeHandle> = LazyLock::new(|| TypeHandle::untyped(TypeKind::Map, "Map"));
        HANDLE.clone()
    }

    /// A collection whose elements are of unknown type.
    pub fn untyped_collection() -> Self {
        static HANDLE: LazyLock<TypeHandle> =
            LazyLock::new(|| TypeHandle::untyped(TypeKind::Collection, "Collection"));
        HANDLE.clone()
    }

    /// An array whose elements are of unknown type.
    pub fn untyped_array() -> Self {
        static HANDLE: LazyLock<TypeHandle> = LazyLock::new(|| TypeHandle::untyped(TypeKind::Array, "Array"));
        HANDLE.clone()
    }

    /// A map type with the given key and value types.
    pub fn map(key: TypeHandle, value: TypeHandle) -> Self {
        let mut data = TypeData::new(TypeKind::Map, Cow::Borrowed("Map"));
        data.key = Some(key);
        data.value = Some(value);
        Self::from_data(data)
    }

    /// A collection type with the given element type.
    pub fn collection(element: TypeHandle) -> Self {
        let mut data = TypeData::new(TypeKind::Collection, Cow::Borrowed("Collection"));
        data.element = Some(element);
        Self::from_data(data)
    }

    /// An array type with the given element type.
    pub fn array(element: TypeHandle) -> Self {
        let mut data = TypeData::new(TypeKind::Array, Cow::Borrowed("Array"));
        data.element = Some(element);
        Self::from_data(data)
    }

    /// A concrete bean type backed by the Rust type `T`.
    ///
    /// The handle name is the bean's type name.
    pub fn bean<T: Bean>(meta: BeanMeta) -> Self {
        let mut data = TypeData::new(TypeKind::Bean, Cow::Owned(String::from(meta.type_name())));
        data.type_id = Some(TypeId::of::<T>());
        data.bean = Some(Arc::new(meta));
        Self::from_data(data)
    }

    /// An abstract bean type, such as a trait implemented by several
    /// beans. It cannot be instantiated; parsers rely on a type
    /// discriminator to pick a concrete type from its dictionary.
    pub fn abstract_bean(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let mut data = TypeData::new(TypeKind::Bean, name.clone());
        data.bean = Some(Arc::new(BeanMeta::new(name)));
        Self::from_data(data)
    }

    /// An opaque object type backed by the Rust type `T`.
    pub fn object<T: Object>(name: impl Into<Cow<'static, str>>) -> Self {
        let mut data = TypeData::new(TypeKind::Object, name.into());
        data.type_id = Some(TypeId::of::<T>());
        Self::from_data(data)
    }

    /// Attaches a type dictionary, used to resolve discriminator names
    /// for values declared with this type.
    pub fn with_dictionary(self, dictionary: BeanDictionary) -> Self {
        self.modify(|data| data.dictionary = Some(dictionary))
    }

    /// Sets the name this type is known by in type dictionaries.
    pub fn with_dictionary_name(self, name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        self.modify(|data| data.dictionary_name = Some(name))
    }

    /// Wraps every serialized value of this type in a single-key object.
    pub fn with_wrapper_attr(self, attr: impl Into<Cow<'static, str>>) -> Self {
        let attr = attr.into();
        self.modify(|data| data.wrapper_attr = Some(attr))
    }

    /// Sets the string constructor used for map keys and lax input.
    pub fn with_from_string(self, from_string: FromStringFn) -> Self {
        self.modify(|data| data.from_string = Some(from_string))
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The Rust type behind a bean or opaque object handle.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.0.type_id
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        self.0.kind == TypeKind::Any
    }

    /// The key type of a map, `Any` when unspecified.
    pub fn key_type(&self) -> TypeHandle {
        self.0.key.clone().unwrap_or_else(Self::any)
    }

    /// The value type of a map, `Any` when unspecified.
    pub fn value_type(&self) -> TypeHandle {
        self.0.value.clone().unwrap_or_else(Self::any)
    }

    /// The element type of a collection or array, `Any` when unspecified.
    pub fn element_type(&self) -> TypeHandle {
        self.0.element.clone().unwrap_or_else(Self::any)
    }

    #[inline]
    pub fn bean_meta(&self) -> Option<&Arc<BeanMeta>> {
        self.0.bean.as_ref()
    }

    /// Returns `true` for a bean type with a constructor.
    pub fn can_instantiate(&self) -> bool {
        self.0.bean.as_ref().is_some_and(|meta| !meta.is_abstract())
    }

    #[inline]
    pub fn dictionary(&self) -> Option<&BeanDictionary> {
        self.0.dictionary.as_ref()
    }

    #[inline]
    pub fn dictionary_name(&self) -> Option<&str> {
        self.0.dictionary_name.as_deref()
    }

    #[inline]
    pub fn wrapper_attr(&self) -> Option<&str> {
        self.0.wrapper_attr.as_deref()
    }

    #[inline]
    pub fn from_string(&self) -> Option<FromStringFn> {
        self.0.from_string
    }

    /// Pairs property values with this bean's property declarations,
    /// in declaration order.
    ///
    /// Returns an empty list for non-bean handles.
    pub fn property_values<I>(&self, values: I) -> Vec<PropertyValue>
    where
        I: IntoIterator<Item = Value>,
    {
        self.property_results(values.into_iter().map(Ok))
    }

    /// Like [`property_values`](Self::property_values), for getters
    /// that can fail.
    pub fn property_results<I>(&self, values: I) -> Vec<PropertyValue>
    where
        I: IntoIterator<Item = Result<Value, PropertyError>>,
    {
        match &self.0.bean {
            Some(meta) => meta.results(values),
            None => Vec::new(),
        }
    }

    /// Returns `true` if both handles point to the same descriptor.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// -----------------------------------------------------------------------------
// Traits

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.0.type_id, other.0.type_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.0.kind == other.0.kind
                    && self.0.name == other.0.name
                    && self.key_type() == other.key_type()
                    && self.value_type() == other.value_type()
                    && self.element_type() == other.element_type()
            }
            _ => false,
        }
    }
}

impl Eq for TypeHandle {}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            TypeKind::Map => write!(f, "{}<{},{}>", self.0.name, self.key_type(), self.value_type()),
            TypeKind::Collection => write!(f, "{}<{}>", self.0.name, self.element_type()),
            TypeKind::Array => write!(f, "{}[]", self.element_type()),
            _ => f.write_str(&self.0.name),
        }
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeHandle")
            .field(&format_args!("{self}"))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::TypeHandle;
    use crate::bean::BeanDictionary;
    use crate::info::TypeKind;

    #[test]
    fn shared_handles_are_cached() {
        assert!(TypeHandle::string().ptr_eq(&TypeHandle::string()));
        assert!(TypeHandle::untyped_map().ptr_eq(&TypeHandle::untyped_map()));
        assert_eq!(TypeHandle::any().kind(), TypeKind::Any);
    }

    #[test]
    fn structural_equality_without_type_id() {
        let a = TypeHandle::collection(TypeHandle::integer());
        let b = TypeHandle::collection(TypeHandle::integer());
        let c = TypeHandle::collection(TypeHandle::string());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(TypeHandle::untyped_collection(), TypeHandle::collection(TypeHandle::any()));
    }

    #[test]
    fn builders_leave_other_clones_untouched() {
        let base = TypeHandle::abstract_bean("Shape");
        let wrapped = base.clone().with_wrapper_attr("shape");
        assert_eq!(base.wrapper_attr(), None);
        assert_eq!(wrapped.wrapper_attr(), Some("shape"));
        assert!(!wrapped.can_instantiate());

        let with_dict = base.with_dictionary(BeanDictionary::new());
        assert!(with_dict.dictionary().is_some_and(BeanDictionary::is_empty));
    }

    #[test]
    fn display_names() {
        assert_eq!(TypeHandle::array(TypeHandle::float()).to_string(), "Float[]");
        assert_eq!(TypeHandle::untyped_map().to_string(), "Map<Any,Any>");
        assert_eq!(
            TypeHandle::collection(TypeHandle::uri()).to_string(),
            "Collection<Uri>"
        );
    }
}
