use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use marshal_utils::hash::HashMap;

use crate::value::{Number, Value};

/// Hashable form of a scalar map key. Keys without one (floats,
/// containers, beans, streams, objects) are found by scanning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Null,
    Bool(bool),
    Integer(i64),
    Char(char),
    String(String),
    Uri(String),
}

impl IndexKey {
    fn of(key: &Value) -> Option<Self> {
        Some(match key {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(Number::Integer(n)) => Self::Integer(*n),
            Value::Char(c) => Self::Char(*c),
            Value::String(s) => Self::String(s.clone()),
            Value::Uri(s) => Self::Uri(s.clone()),
            _ => return None,
        })
    }
}

/// Entries in insertion order, with positions of the indexable keys.
#[derive(Default)]
struct Entries {
    list: Vec<(Value, Value)>,
    index: HashMap<IndexKey, usize>,
}

impl Entries {
    fn position(&self, key: &Value) -> Option<usize> {
        match IndexKey::of(key) {
            Some(indexed) => self.index.get(&indexed).copied(),
            None => self.list.iter().position(|(k, _)| k == key),
        }
    }

    fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(i) = self.position(&key) {
            return Some(core::mem::replace(&mut self.list[i].1, value));
        }
        if let Some(indexed) = IndexKey::of(&key) {
            self.index.insert(indexed, self.list.len());
        }
        self.list.push((key, value));
        None
    }
}

// -----------------------------------------------------------------------------
// MapRef

/// A shared, insertion-ordered map.
///
/// Keys are compared structurally; inserting an existing key replaces
/// its value in place.
///
/// Readers get snapshots ([`entries`](Self::entries)) rather than
/// guards, so a walker never holds a lock while it recurses into a
/// graph that may contain this map again.
#[derive(Clone, Default)]
pub struct MapRef(Arc<RwLock<Entries>>);

impl MapRef {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts an entry, returning the value it replaced.
    ///
    /// Null, boolean, integer, character, string and URI keys are found
    /// through a hash index; other keys by comparison with every entry.
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.write().insert(key.into(), value.into())
    }

    /// The value stored under a string or URI key.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.read();
        let text = String::from(key);
        let position = entries
            .index
            .get(&IndexKey::String(text.clone()))
            .or_else(|| entries.index.get(&IndexKey::Uri(text)))?;
        Some(entries.list[*position].1.clone())
    }

    /// The value stored under any key.
    pub fn get_value(&self, key: &Value) -> Option<Value> {
        let entries = self.read();
        let position = entries.position(key)?;
        Some(entries.list[position].1.clone())
    }

    /// A snapshot of the entries, in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.read().list.clone()
    }

    pub fn len(&self) -> usize {
        self.read().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().list.is_empty()
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for MapRef {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.read().list.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ListRef

/// A shared, growable list. Backs both collections and arrays.
#[derive(Clone, Default)]
pub struct ListRef(Arc<RwLock<Vec<Value>>>);

impl ListRef {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.read().get(index).cloned()
    }

    /// A snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Vec<Value>> for ListRef {
    fn from(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }
}

impl<T: Into<Value>> FromIterator<T> for ListRef {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// StreamRef

/// Shared raw bytes, written to the output unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamRef(Arc<[u8]>);

impl StreamRef {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamRef({} bytes)", self.0.len())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{ListRef, MapRef, StreamRef};
    use crate::value::Value;

    #[test]
    fn map_insert_replaces_in_place() {
        let map: MapRef = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(map.insert("a", 3), Some(Value::from(1)));
        assert_eq!(map.len(), 2);

        let keys: vec::Vec<_> = map.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(map.get("a"), Some(Value::from(3)));
        assert_eq!(map.get("z"), None);
    }

    #[test]
    fn wide_maps_keep_order_and_replace_in_place() {
        use alloc::format;

        let map = MapRef::new();
        for i in 0..100_000 {
            map.insert(format!("k{i}"), i);
        }
        assert_eq!(map.insert("k5000", -1), Some(Value::from(5000)));
        assert_eq!(map.len(), 100_000);
        assert_eq!(map.get("k5000"), Some(Value::from(-1)));
        assert_eq!(map.get("k99999"), Some(Value::from(99_999)));

        let entries = map.entries();
        assert_eq!(entries[5000].0, Value::from("k5000"));
        assert_eq!(entries[99_999].0, Value::from("k99999"));
    }

    #[test]
    fn map_keys_of_every_kind() {
        let map = MapRef::new();
        map.insert(1, "int");
        map.insert(1.0, "float");
        map.insert(Value::uri("u"), "uri");
        map.insert(Value::Null, "null");
        let nested: MapRef = [("x", 1)].into_iter().collect();
        map.insert(Value::Map(nested.clone()), "map");
        assert_eq!(map.len(), 5);

        assert_eq!(map.insert(1.0, "float2"), Some(Value::from("float")));
        assert_eq!(map.insert(Value::Map(nested.clone()), "map2"), Some(Value::from("map")));
        assert_eq!(map.get_value(&Value::from(1)), Some(Value::from("int")));
        assert_eq!(map.get_value(&Value::Null), Some(Value::from("null")));
        assert_eq!(map.get_value(&Value::Map(nested)), Some(Value::from("map2")));
        assert_eq!(map.get("u"), Some(Value::from("uri")));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn clones_share_storage() {
        let list = ListRef::new();
        let other = list.clone();
        other.push("x");
        assert_eq!(list.len(), 1);
        assert!(list.ptr_eq(&other));
        assert_eq!(list.identity(), other.identity());
        assert!(!list.ptr_eq(&ListRef::new()));
    }

    #[test]
    fn stream_bytes() {
        let stream = StreamRef::new(&b"raw"[..]);
        assert_eq!(stream.as_bytes(), b"raw");
        assert_eq!(stream.len(), 3);
    }
}
