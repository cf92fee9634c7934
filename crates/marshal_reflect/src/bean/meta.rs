use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use marshal_utils::hash::HashMap;

use crate::bean::{Bean, BeanDictionary, PropertyError};
use crate::info::TypeHandle;
use crate::value::Value;

/// Creates an empty instance of a bean type.
pub type BeanConstructor = fn() -> Box<dyn Bean>;

// -----------------------------------------------------------------------------
// PropertyMeta

/// Declaration of one bean property.
#[derive(Clone)]
pub struct PropertyMeta {
    name: Cow<'static, str>,
    ty: TypeHandle,
    uri: bool,
    dictionary: Option<BeanDictionary>,
}

impl PropertyMeta {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeHandle) -> Self {
        Self {
            name: name.into(),
            ty,
            uri: false,
            dictionary: None,
        }
    }

    /// Marks the property as a URI; its text is resolved against the
    /// serializer's URI context.
    pub fn as_uri(mut self) -> Self {
        self.uri = true;
        self
    }

    /// Attaches a property-level type dictionary, consulted before the
    /// declared type's dictionary.
    pub fn with_dictionary(mut self, dictionary: BeanDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &TypeHandle {
        &self.ty
    }

    #[inline]
    pub fn is_uri(&self) -> bool {
        self.uri
    }

    #[inline]
    pub fn dictionary(&self) -> Option<&BeanDictionary> {
        self.dictionary.as_ref()
    }
}

impl fmt::Debug for PropertyMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMeta")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

/// A property declaration paired with its current value.
#[derive(Debug, Clone)]
pub struct PropertyValue {
    pub meta: PropertyMeta,
    pub value: Result<Value, PropertyError>,
}

// -----------------------------------------------------------------------------
// BeanMeta

/// The static shape of a bean type.
///
/// A bean type without a constructor is abstract: it can describe
/// declared types but never be instantiated by a parser.
#[derive(Clone)]
pub struct BeanMeta {
    type_name: Cow<'static, str>,
    properties: Vec<PropertyMeta>,
    index: HashMap<Cow<'static, str>, usize>,
    constructor: Option<BeanConstructor>,
}

impl BeanMeta {
    pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Vec::new(),
            index: HashMap::default(),
            constructor: None,
        }
    }

    /// Adds a property, replacing an earlier one with the same name.
    pub fn with_property(mut self, property: PropertyMeta) -> Self {
        match self.index.get(property.name()) {
            Some(&at) => self.properties[at] = property,
            None => {
                self.index.insert(property.name.clone(), self.properties.len());
                self.properties.push(property);
            }
        }
        self
    }

    pub fn with_constructor(mut self, constructor: BeanConstructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyMeta] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
        self.index.get(name).map(|&at| &self.properties[at])
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.constructor.is_none()
    }

    /// Creates an empty instance, or `None` for abstract types.
    pub fn new_instance(&self) -> Option<Box<dyn Bean>> {
        self.constructor.map(|construct| construct())
    }

    /// Pairs getter results with property declarations, in order.
    ///
    /// Extra results are dropped, missing ones leave their property out.
    pub fn results<I>(&self, values: I) -> Vec<PropertyValue>
    where
        I: IntoIterator<Item = Result<Value, PropertyError>>,
    {
        self.properties
            .iter()
            .zip(values)
            .map(|(meta, value)| PropertyValue {
                meta: meta.clone(),
                value,
            })
            .collect()
    }
}

impl fmt::Debug for BeanMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanMeta")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .field("abstract", &self.is_abstract())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
