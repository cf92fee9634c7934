use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;

use marshal_reflect::convert::{ConvertError, convert_scalar, convert_str};
use marshal_reflect::swap::Swap;
use marshal_reflect::{Bean, BeanRef, ListRef, MapRef, PropertyMeta, TypeHandle, TypeKind, Value};

use crate::config::ParserConfig;
use crate::context::BeanContext;
use crate::de::ParserReader;
use crate::error::{ParseError, ParseErrorKind, ParseLocation};

// -----------------------------------------------------------------------------
// ParserSession

/// Per-call state of a parser.
///
/// Owns the input cursor, the nesting depth and the class and property
/// currently being populated, which every error reports. Format parsers
/// drive the grammar and call back into the session for coercion and
/// bean construction.
pub struct ParserSession<'a> {
    reader: ParserReader<'a>,
    config: &'a ParserConfig,
    context: &'a BeanContext,
    current_class: Option<String>,
    current_property: Option<String>,
    depth: usize,
}

impl<'a> ParserSession<'a> {
    pub fn new(input: &'a str, config: &'a ParserConfig, context: &'a BeanContext) -> Self {
        Self {
            reader: ParserReader::new(input),
            config,
            context,
            current_class: None,
            current_property: None,
            depth: 0,
        }
    }

    #[inline]
    pub fn reader(&self) -> &ParserReader<'a> {
        &self.reader
    }

    #[inline]
    pub fn reader_mut(&mut self) -> &mut ParserReader<'a> {
        &mut self.reader
    }

    #[inline]
    pub fn config(&self) -> &'a ParserConfig {
        self.config
    }

    #[inline]
    pub fn context(&self) -> &'a BeanContext {
        self.context
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.config.strict()
    }

    // -------------------------------------------------------------------------
    // Location and errors

    /// Sets the class being populated, returning the previous one.
    pub fn set_current_class(&mut self, class: Option<&TypeHandle>) -> Option<String> {
        core::mem::replace(&mut self.current_class, class.map(ToString::to_string))
    }

    pub fn restore_current_class(&mut self, class: Option<String>) {
        self.current_class = class;
    }

    /// Sets the property being populated, returning the previous one.
    pub fn set_current_property(&mut self, property: Option<&str>) -> Option<String> {
        core::mem::replace(&mut self.current_property, property.map(String::from))
    }

    pub fn restore_current_property(&mut self, property: Option<String>) {
        self.current_property = property;
    }

    pub fn location_at(&self, offset: usize) -> ParseLocation {
        let (line, column) = self.reader.line_column(offset);
        let radius = self.config.debug_output_lines();
        let snippet = (radius > 0 && !self.reader.input().is_empty())
            .then(|| self.reader.snippet(line, radius));
        ParseLocation {
            offset,
            line,
            column,
            current_class: self.current_class.clone(),
            current_property: self.current_property.clone(),
            snippet,
        }
    }

    /// An error at the current input position.
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.reader.position(), kind)
    }

    pub fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.location_at(offset))
    }

    pub fn syntax_error(&self, message: impl Into<String>) -> ParseError {
        self.error(ParseErrorKind::Syntax(message.into()))
    }

    // -------------------------------------------------------------------------
    // Depth

    /// Enters one level of nesting.
    ///
    /// Fails with [`ParseErrorKind::DepthTooDeep`] past the configured
    /// maximum depth, before the native stack is at risk.
    pub fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.config.max_depth() {
            return Err(self.error(ParseErrorKind::DepthTooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    // -------------------------------------------------------------------------
    // Coercion

    /// Trims parsed text if the session trims strings.
    pub fn trim(&self, text: String) -> String {
        if self.config.trim_strings() {
            String::from(text.trim())
        } else {
            text
        }
    }

    /// Converts attribute text, such as a map key, to type `ty`.
    ///
    /// If `ty` has a swap, the text is converted to the swapped type and
    /// then unswapped. Booleans are lenient: anything other than a
    /// case-insensitive `"true"` is `false`.
    pub fn convert_attr_to_type(&self, text: &str, ty: &TypeHandle) -> Result<Value, ParseError> {
        let swap = self.context.swaps().get(ty);
        let target = swap.map_or_else(|| ty.clone(), |swap| swap.swapped_type());
        let value = convert_str(text, &target).map_err(|e| self.error(ParseErrorKind::Convert(e)))?;
        match swap {
            Some(swap) => self.unswap(swap, &value, ty),
            None => Ok(value),
        }
    }

    /// Converts a parsed value to type `ty`.
    ///
    /// Maps and collections are converted element by element; maps
    /// become beans through [`cast`](Self::cast); scalars follow
    /// [`convert_scalar`].
    pub fn convert_to_type(&mut self, value: Value, ty: &TypeHandle) -> Result<Value, ParseError> {
        self.convert_member(value, ty, None)
    }

    fn convert_member(
        &mut self,
        value: Value,
        ty: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<Value, ParseError> {
        if value.is_null() || ty.kind() == TypeKind::Void {
            return Ok(Value::Null);
        }
        let context = self.context;
        if let Some(swap) = context.swaps().get(ty) {
            if value.runtime_type() == *ty {
                return Ok(value);
            }
            let swapped = self.convert_member(value, &swap.swapped_type(), property)?;
            return self.unswap(swap, &swapped, ty);
        }

        match (ty.kind(), value) {
            (TypeKind::Any | TypeKind::Bean, Value::Map(map)) => self.cast(map, ty, property),
            (TypeKind::Any, value) => Ok(value),
            (TypeKind::Bean, Value::Bean(bean)) => {
                if ty.type_id().is_none() || bean.type_handle() == *ty {
                    Ok(Value::Bean(bean))
                } else {
                    Err(self.mismatch("bean", ty))
                }
            }
            (TypeKind::Map, Value::Map(map)) => self.convert_map(map, ty),
            (TypeKind::Collection, Value::Collection(list) | Value::Array(list)) => {
                self.convert_list(list, ty).map(Value::Collection)
            }
            (TypeKind::Array, Value::Collection(list) | Value::Array(list)) => {
                self.convert_list(list, ty).map(Value::Array)
            }
            (_, value) => convert_scalar(&value, ty).map_err(|e| self.error(ParseErrorKind::Convert(e))),
        }
    }

    fn mismatch(&self, found: &'static str, ty: &TypeHandle) -> ParseError {
        self.error(ParseErrorKind::Convert(ConvertError::Mismatch {
            found,
            target: ty.to_string(),
        }))
    }

    fn convert_map(&mut self, map: MapRef, ty: &TypeHandle) -> Result<Value, ParseError> {
        let (key_type, value_type) = (ty.key_type(), ty.value_type());
        if key_type.is_any() && value_type.is_any() {
            return Ok(Value::Map(map));
        }
        let converted = MapRef::new();
        for (key, value) in map.entries() {
            let key = match key.as_text() {
                Some(text) if !key_type.is_any() => self.convert_attr_to_type(&text, &key_type)?,
                _ => key,
            };
            let value = self.convert_to_type(value, &value_type)?;
            converted.insert(key, value);
        }
        Ok(Value::Map(converted))
    }

    fn convert_list(&mut self, list: ListRef, ty: &TypeHandle) -> Result<ListRef, ParseError> {
        let element = ty.element_type();
        if element.is_any() {
            return Ok(list);
        }
        let converted = ListRef::new();
        for item in list.to_vec() {
            converted.push(self.convert_to_type(item, &element)?);
        }
        Ok(converted)
    }

    /// Reverses a swap on a parsed stand-in value.
    pub fn unswap(&self, swap: &Arc<dyn Swap>, value: &Value, ty: &TypeHandle) -> Result<Value, ParseError> {
        swap.unswap(value, ty)
            .map_err(|e| self.error(ParseErrorKind::Swap(e)))
    }

    // -------------------------------------------------------------------------
    // Beans

    /// Resolves a type discriminator.
    ///
    /// Looks in the dictionary of the property being parsed, then of the
    /// expected type, then of the session. First match wins.
    pub fn resolve_bean_type(
        &self,
        name: &str,
        expected: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Option<TypeHandle> {
        [
            property.and_then(PropertyMeta::dictionary),
            expected.dictionary(),
            Some(self.context.dictionary()),
        ]
        .into_iter()
        .flatten()
        .find_map(|dictionary| dictionary.get(name))
        .cloned()
        .or_else(|| (expected.dictionary_name() == Some(name)).then(|| expected.clone()))
    }

    /// Turns a parsed map into a bean if it carries a resolvable type
    /// discriminator, or if `expected` is a concrete bean type.
    ///
    /// A map without a usable discriminator is returned unchanged when
    /// any value is expected.
    pub fn cast(
        &mut self,
        map: MapRef,
        expected: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<Value, ParseError> {
        let type_name = map
            .get(self.context.type_property_name())
            .and_then(|name| name.as_text().map(|text| text.into_owned()));

        let Some(type_name) = type_name else {
            return match expected.kind() {
                TypeKind::Bean => self.map_to_bean(&map, expected),
                _ => Ok(Value::Map(map)),
            };
        };
        match self.resolve_bean_type(&type_name, expected, property) {
            Some(ty) => self.map_to_bean(&map, &ty),
            None if expected.kind() == TypeKind::Bean => {
                Err(self.error(ParseErrorKind::UnresolvedTypeName {
                    name: type_name,
                    class: expected.to_string(),
                }))
            }
            None => Ok(Value::Map(map)),
        }
    }

    fn map_to_bean(&mut self, map: &MapRef, ty: &TypeHandle) -> Result<Value, ParseError> {
        let mut bean = self.new_bean(ty)?;
        let previous = self.set_current_class(Some(ty));
        for (key, value) in map.entries() {
            let key = key.as_text().unwrap_or_default();
            self.set_bean_property(bean.as_mut(), ty, &key, value)?;
        }
        self.restore_current_class(previous);
        Ok(Value::Bean(BeanRef::from_box(bean)))
    }

    /// Creates an empty instance of a bean type.
    pub fn new_bean(&self, ty: &TypeHandle) -> Result<Box<dyn Bean>, ParseError> {
        ty.bean_meta()
            .and_then(|meta| meta.new_instance())
            .ok_or_else(|| self.error(ParseErrorKind::NotInstantiable(ty.to_string())))
    }

    /// Converts `value` to the declared type of property `name` and sets
    /// it on `bean`.
    ///
    /// Properties the bean type does not declare go through the
    /// unknown-property policy.
    pub fn set_bean_property(
        &mut self,
        bean: &mut dyn Bean,
        class: &TypeHandle,
        name: &str,
        value: Value,
    ) -> Result<(), ParseError> {
        let Some(meta) = class.bean_meta().and_then(|meta| meta.property(name)) else {
            return self.on_unknown_property(class, name, &value);
        };
        let previous = self.set_current_property(Some(name));
        let value = self.convert_member(value, meta.ty(), Some(meta))?;
        if let Err(source) = bean.set_property(name, value) {
            let err = self.error(ParseErrorKind::Setter {
                property: String::from(name),
                class: class.to_string(),
            });
            return Err(err.with_source(source));
        }
        self.restore_current_property(previous);
        Ok(())
    }

    /// Applies the unknown-property policy.
    ///
    /// The type discriminator is never unknown. Otherwise the property
    /// is an error unless unknown properties are ignored, or the value is
    /// null and unknown null properties are ignored.
    pub fn on_unknown_property(
        &self,
        class: &TypeHandle,
        property: &str,
        value: &Value,
    ) -> Result<(), ParseError> {
        if property == self.context.type_property_name() {
            return Ok(());
        }
        let ignored = self.context.ignore_unknown_properties()
            || (value.is_null() && self.context.ignore_unknown_null_properties());
        if !ignored {
            return Err(self.error(ParseErrorKind::UnknownProperty {
                property: String::from(property),
                class: class.to_string(),
            }));
        }
        match self.context.parser_listener() {
            Some(listener) => listener.on_unknown_property(property, class.name()),
            None => log::debug!("Ignoring unknown property '{property}' on class '{class}'"),
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};

    use marshal_reflect::bean::PropertyValue;
    use marshal_reflect::{
        Bean, BeanDictionary, BeanMeta, MapRef, PropertyError, PropertyMeta, TypeHandle, Value,
    };

    use super::ParserSession;
    use crate::config::ParserConfig;
    use crate::context::BeanContext;
    use crate::error::ParseErrorKind;
    use crate::listener::ParserListener;

    #[derive(Debug, Default)]
    struct Dog {
        name: String,
        good: bool,
    }

    fn dog_type() -> TypeHandle {
        TypeHandle::bean::<Dog>(
            BeanMeta::new("Dog")
                .with_property(PropertyMeta::new("name", TypeHandle::string()))
                .with_property(PropertyMeta::new("good", TypeHandle::bool()))
                .with_constructor(|| Box::new(Dog::default())),
        )
    }

    fn animal_type() -> TypeHandle {
        TypeHandle::abstract_bean("Animal")
            .with_dictionary(BeanDictionary::new().with("dog", dog_type()))
    }

    impl Bean for Dog {
        fn type_handle(&self) -> TypeHandle {
            dog_type()
        }

        fn properties(&self) -> Vec<PropertyValue> {
            self.type_handle()
                .property_values([Value::from(self.name.as_str()), Value::from(self.good)])
        }

        fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
            match (name, value) {
                ("name", Value::String(name)) => self.name = name,
                ("good", Value::Bool(good)) => self.good = good,
                (name, value) => return Err(PropertyError::mismatch(name, value.runtime_type().kind(), &value)),
            }
            Ok(())
        }
    }

    fn dog_map(type_name: Option<&str>) -> MapRef {
        let map = MapRef::new();
        if let Some(type_name) = type_name {
            map.insert("_type", type_name);
        }
        map.insert("name", "rex");
        map.insert("good", "TRUE");
        map
    }

    #[test]
    fn attr_conversion_is_lenient_for_booleans() {
        let (config, context) = (ParserConfig::default(), BeanContext::new());
        let session = ParserSession::new("", &config, &context);
        let bool_ty = TypeHandle::bool();
        assert_eq!(session.convert_attr_to_type("True", &bool_ty).unwrap(), Value::Bool(true));
        assert_eq!(session.convert_attr_to_type("yes", &bool_ty).unwrap(), Value::Bool(false));
        assert_eq!(session.convert_attr_to_type("", &bool_ty).unwrap(), Value::Bool(false));
        assert_eq!(
            session.convert_attr_to_type("hello", &TypeHandle::char()).unwrap(),
            Value::Char('h')
        );
        assert_eq!(
            session.convert_attr_to_type("42", &TypeHandle::integer()).unwrap(),
            Value::from(42)
        );

        let err = session
            .convert_attr_to_type("x", &TypeHandle::untyped_map())
            .unwrap_err();
        assert_eq!(
            err.kind().to_string(),
            "Invalid conversion from string to class 'Map<Any,Any>'"
        );
    }

    #[test]
    fn attr_conversion_unswaps() {
        let (config, context) = (ParserConfig::default(), BeanContext::new());
        let session = ParserSession::new("", &config, &context);
        let ty = marshal_reflect::swap::duration_type();
        let value = session.convert_attr_to_type("1500", &ty).unwrap();
        let duration = value.as_object().and_then(|o| o.downcast_ref::<Duration>().copied());
        assert_eq!(duration, Some(Duration::from_millis(1500)));

        let ty = marshal_reflect::swap::system_time_type();
        let value = session.convert_attr_to_type("0", &ty).unwrap();
        let at = value.as_object().and_then(|o| o.downcast_ref::<SystemTime>().copied());
        assert_eq!(at, Some(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn cast_resolves_discriminator_three_tiers() {
        let (config, context) = (ParserConfig::default(), BeanContext::new());
        let mut session = ParserSession::new("", &config, &context);

        // Expected type's dictionary.
        let value = session.cast(dog_map(Some("dog")), &animal_type(), None).unwrap();
        let dog = value.as_bean().and_then(|b| b.downcast_ref::<Dog>()).unwrap();
        assert_eq!((dog.name.as_str(), dog.good), ("rex", true));

        // Property dictionary wins over the expected type.
        let property = PropertyMeta::new("pet", TypeHandle::any())
            .with_dictionary(BeanDictionary::new().with("hound", dog_type()));
        let value = session
            .cast(dog_map(Some("hound")), &TypeHandle::any(), Some(&property))
            .unwrap();
        assert!(value.as_bean().is_some());

        // Session dictionary last.
        let context =
            BeanContext::new().with_dictionary(BeanDictionary::new().with("mutt", dog_type()));
        let mut session = ParserSession::new("", &config, &context);
        let value = session.cast(dog_map(Some("mutt")), &TypeHandle::any(), None).unwrap();
        assert!(value.as_bean().is_some());
    }

    #[test]
    fn cast_without_resolution() {
        let (config, context) = (ParserConfig::default(), BeanContext::new());
        let mut session = ParserSession::new("", &config, &context);

        let value = session.cast(dog_map(Some("cat")), &TypeHandle::any(), None).unwrap();
        assert!(value.as_map().is_some());

        let err = session.cast(dog_map(Some("cat")), &animal_type(), None).unwrap_err();
        assert!(matches!(err.kind(), ParseErrorKind::UnresolvedTypeName { name, .. } if name == "cat"));

        let err = session.cast(dog_map(None), &animal_type(), None).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::NotInstantiable("Animal".into()));

        let value = session.cast(dog_map(None), &dog_type(), None).unwrap();
        assert!(value.as_bean().and_then(|b| b.downcast_ref::<Dog>()).is_some());
    }

    #[test]
    fn unknown_property_policy() {
        #[derive(Default)]
        struct Counter(Arc<AtomicUsize>);
        impl ParserListener for Counter {
            fn on_unknown_property(&self, _: &str, _: &str) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let config = ParserConfig::default();
        let map = dog_map(None);
        map.insert("unknownField", 1);

        let strict = BeanContext::new();
        let mut session = ParserSession::new("", &config, &strict);
        let err = session.cast(map.clone(), &dog_type(), None).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::UnknownProperty {
                property: "unknownField".into(),
                class: "Dog".into(),
            }
        );
        assert_eq!(err.location().current_class.as_deref(), Some("Dog"));

        let count = Arc::new(AtomicUsize::new(0));
        let lenient = BeanContext::new()
            .with_ignore_unknown_properties(true)
            .with_parser_listener(Counter(count.clone()));
        let mut session = ParserSession::new("", &config, &lenient);
        assert!(session.cast(map, &dog_type(), None).is_ok());
        assert_eq!(count.load(Ordering::Relaxed), 1);

        // Null values are ignored by default even when unknown.
        let map = dog_map(None);
        map.insert("gone", Value::Null);
        let mut session = ParserSession::new("", &config, &strict);
        assert!(session.cast(map.clone(), &dog_type(), None).is_ok());

        let no_nulls = BeanContext::new().with_ignore_unknown_null_properties(false);
        let mut session = ParserSession::new("", &config, &no_nulls);
        assert!(session.cast(map, &dog_type(), None).is_err());
    }

    #[test]
    fn depth_is_bounded() {
        let config = ParserConfig::default().with_max_depth(2);
        let context = BeanContext::new();
        let mut session = ParserSession::new("[[[", &config, &context);
        assert!(session.enter().is_ok());
        assert!(session.enter().is_ok());
        let err = session.enter().unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::DepthTooDeep);
        session.leave();
        assert_eq!(session.depth(), 1);
    }

    #[test]
    fn errors_carry_location_and_snippet() {
        let config = ParserConfig::default().with_debug_output_lines(1);
        let context = BeanContext::new();
        let mut session = ParserSession::new("{\n  \"a\": ?\n}", &config, &context);
        while session.reader().peek() != Some('?') {
            session.reader_mut().next();
        }
        session.set_current_property(Some("a"));
        let err = session.syntax_error("Unrecognized syntax");
        assert_eq!(err.location().line, 2);
        assert_eq!(err.location().column, 8);
        assert_eq!(
            err.to_string(),
            "Unrecognized syntax at line 2, column 8, currentProperty='a'\n     1: {\n*    2:   \"a\": ?\n     3: }\n"
        );
    }

    #[test]
    fn containers_convert_elements() {
        let (config, context) = (ParserConfig::default(), BeanContext::new());
        let mut session = ParserSession::new("", &config, &context);

        let ty = TypeHandle::array(TypeHandle::integer());
        let value = session.convert_to_type(Value::collection(["1", "2"]), &ty).unwrap();
        assert_eq!(value, Value::array([1, 2]));

        let ty = TypeHandle::map(TypeHandle::integer(), TypeHandle::float());
        let map: MapRef = [("1", 2)].into_iter().collect();
        let value = session.convert_to_type(Value::Map(map), &ty).unwrap();
        let expected: MapRef = [(1, 2.0)].into_iter().collect();
        assert_eq!(value, Value::Map(expected));
    }
}
