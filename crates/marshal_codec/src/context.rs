use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use marshal_reflect::BeanDictionary;
use marshal_reflect::swap::SwapRegistry;

use crate::listener::{ParserListener, SerializerListener};

/// Type metadata and policies shared by serializers and parsers.
///
/// A context is cheap to clone: the swap registry and listeners are
/// shared.
#[derive(Clone)]
pub struct BeanContext {
    swaps: Arc<SwapRegistry>,
    dictionary: BeanDictionary,
    type_property_name: Cow<'static, str>,
    ignore_unknown_properties: bool,
    ignore_unknown_null_properties: bool,
    ignore_getter_errors: bool,
    serializer_listener: Option<Arc<dyn SerializerListener>>,
    parser_listener: Option<Arc<dyn ParserListener>>,
}

impl Default for BeanContext {
    fn default() -> Self {
        Self {
            swaps: Arc::new(SwapRegistry::new()),
            dictionary: BeanDictionary::new(),
            type_property_name: Cow::Borrowed("_type"),
            ignore_unknown_properties: false,
            ignore_unknown_null_properties: true,
            ignore_getter_errors: true,
            serializer_listener: None,
            parser_listener: None,
        }
    }
}

impl BeanContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_swaps(mut self, swaps: SwapRegistry) -> Self {
        self.swaps = Arc::new(swaps);
        self
    }

    /// Sets the session-wide type dictionary, the last place a type
    /// discriminator is looked up.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: BeanDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Renames the discriminator attribute (`_type` by default).
    #[must_use]
    pub fn with_type_property_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.type_property_name = name.into();
        self
    }

    #[must_use]
    pub fn with_ignore_unknown_properties(mut self, ignore: bool) -> Self {
        self.ignore_unknown_properties = ignore;
        self
    }

    #[must_use]
    pub fn with_ignore_unknown_null_properties(mut self, ignore: bool) -> Self {
        self.ignore_unknown_null_properties = ignore;
        self
    }

    #[must_use]
    pub fn with_ignore_getter_errors(mut self, ignore: bool) -> Self {
        self.ignore_getter_errors = ignore;
        self
    }

    #[must_use]
    pub fn with_serializer_listener(mut self, listener: impl SerializerListener + 'static) -> Self {
        self.serializer_listener = Some(Arc::new(listener));
        self
    }

    #[must_use]
    pub fn with_parser_listener(mut self, listener: impl ParserListener + 'static) -> Self {
        self.parser_listener = Some(Arc::new(listener));
        self
    }

    #[inline]
    pub fn swaps(&self) -> &SwapRegistry {
        &self.swaps
    }

    #[inline]
    pub fn dictionary(&self) -> &BeanDictionary {
        &self.dictionary
    }

    #[inline]
    pub fn type_property_name(&self) -> &str {
        &self.type_property_name
    }

    #[inline]
    pub fn ignore_unknown_properties(&self) -> bool {
        self.ignore_unknown_properties
    }

    #[inline]
    pub fn ignore_unknown_null_properties(&self) -> bool {
        self.ignore_unknown_null_properties
    }

    #[inline]
    pub fn ignore_getter_errors(&self) -> bool {
        self.ignore_getter_errors
    }

    #[inline]
    pub fn serializer_listener(&self) -> Option<&dyn SerializerListener> {
        self.serializer_listener.as_deref()
    }

    #[inline]
    pub fn parser_listener(&self) -> Option<&dyn ParserListener> {
        self.parser_listener.as_deref()
    }
}

impl fmt::Debug for BeanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanContext")
            .field("swaps", &self.swaps)
            .field("dictionary", &self.dictionary)
            .field("type_property_name", &self.type_property_name)
            .field("ignore_unknown_properties", &self.ignore_unknown_properties)
            .field("ignore_unknown_null_properties", &self.ignore_unknown_null_properties)
            .field("ignore_getter_errors", &self.ignore_getter_errors)
            .finish_non_exhaustive()
    }
}
