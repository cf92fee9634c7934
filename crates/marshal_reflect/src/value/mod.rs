//! Nodes of an object graph.
//!
//! - [`Value`]: the sum of everything a walker can meet.
//! - [`Number`]: integer or floating point number.
//! - [`MapRef`], [`ListRef`], [`StreamRef`]: shared containers. Their
//!   identity is the address of the shared allocation.
//! - [`Object`], [`ObjectRef`]: opaque values with a string form, such as
//!   timestamps; usually given a swap.

// -----------------------------------------------------------------------------
// Modules

mod containers;
mod number;
mod object;
mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use containers::{ListRef, MapRef, StreamRef};
pub use number::Number;
pub use object::{Object, ObjectRef};

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::bean::{Bean, BeanRef};
use crate::info::TypeHandle;

// -----------------------------------------------------------------------------
// Value

/// A node of an object graph.
///
/// Scalars are held by value. Containers, beans and objects are shared
/// handles: cloning a `Value` never copies a container, and a graph may
/// refer to the same container from several places, or from itself.
///
/// # Examples
///
/// ```
/// use marshal_reflect::{ListRef, MapRef, Value};
///
/// let list = ListRef::new();
/// let map = MapRef::new();
/// map.insert("items", list.clone());
/// list.push(1);
///
/// // `map` sees the element pushed after insertion.
/// let items = map.get("items").unwrap();
/// assert_eq!(items.as_list().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Char(char),
    String(String),
    Uri(String),
    Map(MapRef),
    Collection(ListRef),
    Array(ListRef),
    Bean(BeanRef),
    Stream(StreamRef),
    Object(ObjectRef),
}

impl Value {
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    pub fn bean<T: Bean>(bean: T) -> Self {
        Self::Bean(BeanRef::new(bean))
    }

    pub fn object<T: Object>(object: T) -> Self {
        Self::Object(ObjectRef::new(object))
    }

    pub fn collection<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Collection(items.into_iter().collect())
    }

    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Array(items.into_iter().collect())
    }

    /// The runtime type of this value.
    ///
    /// Containers report their untyped variant; beans and objects report
    /// their own handle. `Null` reports `Any`.
    pub fn runtime_type(&self) -> TypeHandle {
        match self {
            Self::Null => TypeHandle::any(),
            Self::Bool(_) => TypeHandle::bool(),
            Self::Number(Number::Integer(_)) => TypeHandle::integer(),
            Self::Number(Number::Float(_)) => TypeHandle::float(),
            Self::Char(_) => TypeHandle::char(),
            Self::String(_) => TypeHandle::string(),
            Self::Uri(_) => TypeHandle::uri(),
            Self::Map(_) => TypeHandle::untyped_map(),
            Self::Collection(_) => TypeHandle::untyped_collection(),
            Self::Array(_) => TypeHandle::untyped_array(),
            Self::Bean(bean) => bean.type_handle(),
            Self::Stream(_) => TypeHandle::stream(),
            Self::Object(object) => object.type_handle(),
        }
    }

    /// A short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Uri(_) => "uri",
            Self::Map(_) => "map",
            Self::Collection(_) => "collection",
            Self::Array(_) => "array",
            Self::Bean(_) => "bean",
            Self::Stream(_) => "stream",
            Self::Object(_) => "object",
        }
    }

    /// The identity of a shared value, `None` for scalars.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Map(map) => Some(map.identity()),
            Self::Collection(list) | Self::Array(list) => Some(list.identity()),
            Self::Bean(bean) => Some(bean.identity()),
            Self::Stream(stream) => Some(stream.identity()),
            Self::Object(object) => Some(object.identity()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// The text of a `String` or `Uri`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Uri(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The elements of a `Collection` or `Array`.
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Self::Collection(list) | Self::Array(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_bean(&self) -> Option<&BeanRef> {
        match self {
            Self::Bean(bean) => Some(bean),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The string form of a scalar or opaque object.
    ///
    /// Returns `None` for null, containers, beans and streams.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) | Self::Uri(s) => Some(Cow::Borrowed(s)),
            Self::Bool(true) => Some(Cow::Borrowed("true")),
            Self::Bool(false) => Some(Cow::Borrowed("false")),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Char(c) => Some(Cow::Owned(c.to_string())),
            Self::Object(object) => Some(Cow::Owned(object.to_text())),
            _ => None,
        }
    }

    /// The natural ordering of two scalars of the same category.
    ///
    /// Numbers compare numerically, strings and URIs lexically. Values
    /// without a natural ordering, or of different categories, return
    /// `None`.
    pub fn natural_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.natural_cmp(b),
            (Self::String(a) | Self::Uri(a), Self::String(b) | Self::Uri(b)) => Some(a.cmp(b)),
            (Self::Char(a), Self::Char(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn bean_eq(a: &BeanRef, b: &BeanRef) -> bool {
    if a.type_handle() != b.type_handle() {
        return false;
    }
    let (a, b) = (a.properties(), b.properties());
    a.len() == b.len()
        && a.iter()
            .zip(&b)
            .all(|(a, b)| a.meta.name() == b.meta.name() && a.value == b.value)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) | (Self::Uri(a), Self::Uri(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a.ptr_eq(b) || a.entries() == b.entries(),
            (Self::Collection(a), Self::Collection(b)) | (Self::Array(a), Self::Array(b)) => {
                a.ptr_eq(b) || a.to_vec() == b.to_vec()
            }
            (Self::Bean(a), Self::Bean(b)) => a.ptr_eq(b) || bean_eq(a, b),
            (Self::Stream(a), Self::Stream(b)) => a.as_bytes() == b.as_bytes(),
            (Self::Object(a), Self::Object(b)) => {
                a.ptr_eq(b) || (a.type_handle() == b.type_handle() && a.to_text() == b.to_text())
            }
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! from_integer {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::Number(Number::Integer(i64::from(value)))
            }
        }
    )*};
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Number(Number::Float(f64::from(value)))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    #[inline]
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for Value {
    #[inline]
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<MapRef> for Value {
    #[inline]
    fn from(value: MapRef) -> Self {
        Self::Map(value)
    }
}

impl From<ListRef> for Value {
    #[inline]
    fn from(value: ListRef) -> Self {
        Self::Collection(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::Collection(ListRef::from(value))
    }
}

impl From<BeanRef> for Value {
    #[inline]
    fn from(value: BeanRef) -> Self {
        Self::Bean(value)
    }
}

impl From<ObjectRef> for Value {
    #[inline]
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl From<StreamRef> for Value {
    #[inline]
    fn from(value: StreamRef) -> Self {
        Self::Stream(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;

    use super::{ListRef, MapRef, Number, Value};
    use crate::info::TypeKind;

    #[test]
    fn identity_follows_shared_handles() {
        let list = ListRef::new();
        let a = Value::Collection(list.clone());
        let b = Value::Collection(list);
        let c = Value::collection([1, 2]);
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert_eq!(Value::from("x").identity(), None);
    }

    #[test]
    fn runtime_types() {
        assert_eq!(Value::from(1).runtime_type().kind(), TypeKind::Integer);
        assert_eq!(Value::from(1.5).runtime_type().kind(), TypeKind::Float);
        assert_eq!(Value::uri("/a").runtime_type().kind(), TypeKind::Uri);
        assert_eq!(Value::array([true]).runtime_type().kind(), TypeKind::Array);
        assert_eq!(Value::Map(MapRef::new()).runtime_type().kind(), TypeKind::Map);
    }

    #[test]
    fn natural_ordering_within_category() {
        assert_eq!(Value::from(1).natural_cmp(&Value::from(2.5)), Some(Ordering::Less));
        assert_eq!(Value::from("b").natural_cmp(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::from("1").natural_cmp(&Value::from(1)), None);
        assert_eq!(Value::Null.natural_cmp(&Value::Null), None);
    }

    #[test]
    fn structural_equality() {
        let a = Value::collection([Value::from(1), Value::from("x")]);
        let b = Value::collection([Value::from(1), Value::from("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::array([Value::from(1), Value::from("x")]));
        assert_eq!(Value::from(Option::<i32>::None), Value::Null);
        assert_eq!(Value::from(Some(3_u8)), Value::Number(Number::Integer(3)));
    }

    #[test]
    fn text_forms() {
        assert_eq!(Value::from(true).as_text().as_deref(), Some("true"));
        assert_eq!(Value::from(2.0).as_text().as_deref(), Some("2.0"));
        assert_eq!(Value::from('z').as_text().as_deref(), Some("z"));
        assert_eq!(Value::Map(MapRef::new()).as_text(), None);
    }
}
