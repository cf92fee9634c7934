use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;

use marshal_reflect::bean::PropertyValue;
use marshal_reflect::{
    BeanRef, ListRef, MapRef, PropertyError, PropertyMeta, TypeHandle, TypeKind, Value,
};

use crate::config::SerializerConfig;
use crate::context::BeanContext;
use crate::error::SerializeError;
use crate::recursion::{Guarded, RecursionGuard};
use crate::ser::TreeWriter;

// -----------------------------------------------------------------------------
// SerializerSession

/// Per-call state of a serializer: indentation and the recursion path.
///
/// A session serves exactly one top-level call and is never shared
/// between threads.
pub struct SerializerSession<'a> {
    config: &'a SerializerConfig,
    context: &'a BeanContext,
    guard: RecursionGuard,
    indent: usize,
}

impl<'a> SerializerSession<'a> {
    pub fn new(config: &'a SerializerConfig, context: &'a BeanContext) -> Self {
        Self {
            config,
            context,
            guard: RecursionGuard::new(config.traverse()),
            indent: config.traverse().initial_depth(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SerializerConfig {
        self.config
    }

    #[inline]
    pub fn context(&self) -> &BeanContext {
        self.context
    }

    /// Current indentation level.
    #[inline]
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Serializes a root value and flushes the writer.
    ///
    /// Without an `expected` type the root is declared as its own runtime
    /// type, unless root type discriminators are enabled, in which case
    /// it is declared as `Any`.
    pub fn serialize<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        value: &Value,
        expected: Option<&TypeHandle>,
    ) -> Result<(), SerializeError> {
        let expected = match expected {
            Some(ty) => ty.clone(),
            None if self.config.add_root_type() => TypeHandle::any(),
            None => value.runtime_type(),
        };
        self.serialize_anything(out, value, Some(&expected), "root", None)?;
        out.flush()?;
        Ok(())
    }

    /// Writes exactly one value: a scalar, an object or an array.
    ///
    /// `attr` names the value in recursion diagnostics; `property` is the
    /// bean property the value was read from, if any.
    pub fn serialize_anything<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        value: &Value,
        expected: Option<&TypeHandle>,
        attr: &str,
        property: Option<&PropertyMeta>,
    ) -> Result<(), SerializeError> {
        if value.is_null() {
            return Ok(out.null()?);
        }
        let expected = expected.cloned().unwrap_or_else(TypeHandle::any);

        self.indent += 1;
        let result = self.serialize_tracked(out, value, &expected, attr, property);
        self.indent -= 1;
        result
    }

    fn serialize_tracked<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        value: &Value,
        expected: &TypeHandle,
        attr: &str,
        property: Option<&PropertyMeta>,
    ) -> Result<(), SerializeError> {
        let is_root = self.guard.depth() == 0;
        let mut actual = value.runtime_type();
        let guarded = self.guard.push(String::from(attr), value, &actual)?;

        let mut value = value.clone();
        if guarded == Guarded::Recursion {
            value = Value::Null;
            actual = TypeHandle::any();
        }

        let result = self.serialize_resolved(out, value, expected, actual, is_root, property);
        if guarded.needs_pop() {
            self.guard.pop();
        }
        result
    }

    fn serialize_resolved<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        mut value: Value,
        expected: &TypeHandle,
        actual: TypeHandle,
        is_root: bool,
        property: Option<&PropertyMeta>,
    ) -> Result<(), SerializeError> {
        let type_name = self.bean_type_name(expected, &actual, is_root, property);

        let mut serialized = actual.clone();
        if let Some(swap) = self.context.swaps().get(&actual) {
            value = swap.swap(&value).map_err(|source| SerializeError::Swap {
                class: actual.to_string(),
                source,
            })?;
            serialized = swap.swapped_type();
            if serialized.is_any() {
                serialized = value.runtime_type();
            }
        }

        let wrapper = serialized.wrapper_attr();
        if let Some(wrapper) = wrapper {
            out.object_start()?;
            out.cr(self.indent)?;
            out.attr(wrapper)?;
            out.key_separator(self.indent)?;
            self.indent += 1;
        }

        self.dispatch(out, &value, expected, &serialized, type_name.as_deref(), property)?;

        if wrapper.is_some() {
            self.indent -= 1;
            out.cre(self.indent - 1)?;
            out.object_end()?;
        }
        Ok(())
    }

    fn dispatch<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        value: &Value,
        expected: &TypeHandle,
        serialized: &TypeHandle,
        type_name: Option<&str>,
        property: Option<&PropertyMeta>,
    ) -> Result<(), SerializeError> {
        let is_uri = serialized.kind() == TypeKind::Uri || property.is_some_and(PropertyMeta::is_uri);

        match value {
            Value::Null | Value::Char('\0') => out.null()?,
            Value::Number(n) if n.as_f64().is_finite() => out.literal(&n.to_string())?,
            Value::Number(_) => out.null()?,
            Value::Bool(b) => out.literal(if *b { "true" } else { "false" })?,
            Value::Bean(bean) => self.serialize_bean(out, bean, type_name)?,
            Value::Uri(uri) => self.write_uri(out, uri)?,
            Value::String(text) if is_uri => self.write_uri(out, text)?,
            Value::Map(map) => self.serialize_map(out, map, expected)?,
            Value::Collection(list) | Value::Array(list) => {
                self.serialize_list(out, list, expected)?;
            }
            Value::Stream(stream) => out.raw(stream.as_bytes())?,
            other => match other.as_text() {
                Some(text) if self.config.trim_strings() => out.string_value(text.trim())?,
                Some(text) => out.string_value(&text)?,
                None => out.null()?,
            },
        }
        Ok(())
    }

    fn write_uri<W: TreeWriter + ?Sized>(&self, out: &mut W, uri: &str) -> Result<(), SerializeError> {
        let resolved = self.config.uri_resolver().resolve(uri);
        Ok(out.uri_value(&resolved)?)
    }

    /// The discriminator to emit for a bean, if any.
    ///
    /// Looked up on the actual type, then the dictionaries of the expected
    /// type, the property and the session. A name equal to the expected
    /// type's own name is not emitted.
    fn bean_type_name(
        &self,
        expected: &TypeHandle,
        actual: &TypeHandle,
        is_root: bool,
        property: Option<&PropertyMeta>,
    ) -> Option<String> {
        let enabled = self.config.add_bean_types() || (is_root && self.config.add_root_type());
        if !enabled || actual.kind() != TypeKind::Bean || expected == actual {
            return None;
        }
        let own = expected.dictionary_name();
        let usable = |name: &str| Some(name) != own;

        if let Some(name) = actual.dictionary_name().filter(|&name| usable(name)) {
            return Some(String::from(name));
        }
        [
            expected.dictionary(),
            property.and_then(PropertyMeta::dictionary),
            Some(self.context.dictionary()),
        ]
        .into_iter()
        .flatten()
        .find_map(|dictionary| dictionary.name_of(actual).filter(|&name| usable(name)))
        .map(String::from)
    }

    fn serialize_map<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        map: &MapRef,
        expected: &TypeHandle,
    ) -> Result<(), SerializeError> {
        let value_type = match expected.kind() {
            TypeKind::Map => expected.value_type(),
            _ => TypeHandle::any(),
        };
        let mut entries = map.entries();
        if self.config.sort_maps() {
            sort_by_natural_order(&mut entries, |(key, _)| key);
        }

        let i = self.indent;
        out.object_start()?;
        for (n, (key, value)) in entries.iter().enumerate() {
            if n > 0 {
                out.entry_separator(i)?;
            }
            out.cr(i)?;
            let key = attr_name(key)?;
            out.attr(&key)?;
            out.key_separator(i)?;
            self.serialize_anything(out, value, Some(&value_type), &key, None)?;
        }
        out.cre(i - 1)?;
        out.object_end()?;
        Ok(())
    }

    fn serialize_list<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        list: &ListRef,
        expected: &TypeHandle,
    ) -> Result<(), SerializeError> {
        let element_type = match expected.kind() {
            TypeKind::Collection | TypeKind::Array => expected.element_type(),
            _ => TypeHandle::any(),
        };
        let mut items = list.to_vec();
        if self.config.sort_collections() {
            sort_by_natural_order(&mut items, |item| item);
        }

        let i = self.indent;
        out.array_start()?;
        for (n, item) in items.iter().enumerate() {
            if n > 0 {
                out.entry_separator(i)?;
            }
            out.cr(i)?;
            self.serialize_anything(out, item, Some(&element_type), "<iterator>", None)?;
        }
        out.cre(i - 1)?;
        out.array_end()?;
        Ok(())
    }

    fn serialize_bean<W: TreeWriter + ?Sized>(
        &mut self,
        out: &mut W,
        bean: &BeanRef,
        type_name: Option<&str>,
    ) -> Result<(), SerializeError> {
        let class = bean.type_handle();
        let i = self.indent;
        let mut first = true;
        out.object_start()?;

        if let Some(type_name) = type_name {
            out.cr(i)?;
            out.attr(self.context.type_property_name())?;
            out.key_separator(i)?;
            out.string_value(type_name)?;
            first = false;
        }

        for PropertyValue { meta, value } in bean.properties() {
            let value = match value {
                Ok(value) => value,
                Err(error) => {
                    self.on_getter_error(&meta, &class, error)?;
                    Value::Null
                }
            };
            if self.can_ignore(&value) {
                continue;
            }
            if !first {
                out.entry_separator(i)?;
            }
            first = false;
            out.cr(i)?;
            out.attr(meta.name())?;
            out.key_separator(i)?;
            self.serialize_anything(out, &value, Some(meta.ty()), meta.name(), Some(&meta))?;
        }

        out.cre(i - 1)?;
        out.object_end()?;
        Ok(())
    }

    fn on_getter_error(
        &self,
        meta: &PropertyMeta,
        class: &TypeHandle,
        error: PropertyError,
    ) -> Result<(), SerializeError> {
        if !self.context.ignore_getter_errors() {
            return Err(SerializeError::Getter {
                property: String::from(meta.name()),
                class: class.to_string(),
                source: error,
            });
        }
        match self.context.serializer_listener() {
            Some(listener) => listener.on_getter_error(meta.name(), class.name(), &error),
            None => log::warn!(
                "Could not call getter on property '{}' of class '{class}': {error}",
                meta.name()
            ),
        }
        Ok(())
    }

    /// Returns `true` if a bean property value is trimmed from output.
    fn can_ignore(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.config.trim_null_properties(),
            Value::Collection(list) | Value::Array(list) => {
                self.config.trim_empty_collections() && list.is_empty()
            }
            Value::Map(map) => self.config.trim_empty_maps() && map.is_empty(),
            _ => false,
        }
    }
}

/// The attribute name of a map key. Null keys read `null`.
fn attr_name(key: &Value) -> Result<Cow<'_, str>, SerializeError> {
    match key {
        Value::Null => Ok(Cow::Borrowed("null")),
        _ => key
            .as_text()
            .ok_or_else(|| SerializeError::UnsupportedKey(key.kind_name())),
    }
}

/// Sorts in natural order when every pair is comparable; otherwise leaves
/// the original order.
fn sort_by_natural_order<T>(items: &mut Vec<T>, key: impl Fn(&T) -> &Value) {
    let comparable = items
        .windows(2)
        .all(|pair| key(&pair[0]).natural_cmp(key(&pair[1])).is_some());
    if comparable {
        items.sort_by(|a, b| key(a).natural_cmp(key(b)).unwrap_or(Ordering::Equal));
    }
}

// -----------------------------------------------------------------------------
// Tests
