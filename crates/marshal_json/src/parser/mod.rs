mod session;

use alloc::vec::Vec;

use marshal_codec::{
    BeanContext, MediaType, MediaTypeHandler, ParseError, Parser, ParserConfig, ParserInput,
};
use marshal_reflect::{ListRef, MapRef, TypeHandle, Value};

use self::session::JsonParserSession;

fn media_types(names: &[&str]) -> Vec<MediaType> {
    names
        .iter()
        .filter_map(|name| MediaType::parse(name).ok())
        .collect()
}

// -----------------------------------------------------------------------------
// JsonParser

/// Parses JSON into values.
///
/// The default parser is lax: it accepts comments, single-quoted and
/// unquoted strings, unquoted attribute names, `+` string concatenation
/// and number forms such as `0x1F` or `.5`. [`JsonParser::strict`]
/// accepts only standard JSON and rejects trailing content.
///
/// # Examples
///
/// ```
/// use marshal_codec::{Parser, ParserInput};
/// use marshal_json::JsonParser;
/// use marshal_reflect::TypeHandle;
///
/// let any = TypeHandle::any();
/// let value = JsonParser::new()
///     .parse(ParserInput::from("{a: 'x', /* note */ b: [1, 2]}"), &any)
///     .unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map.get("a").unwrap().as_str(), Some("x"));
///
/// assert!(JsonParser::strict().parse(ParserInput::from("{a: 'x'}"), &any).is_err());
/// ```
pub struct JsonParser {
    config: ParserConfig,
    context: BeanContext,
    validate_end: bool,
    media_types: Vec<MediaType>,
}

impl JsonParser {
    /// A lax parser for `application/json`, `text/json` and their
    /// `+simple` variants.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// A strict parser for `application/json` and `text/json`.
    pub fn strict() -> Self {
        Self::with_config(ParserConfig::default().with_strict(true)).with_validate_end(true)
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let media_types = if config.strict() {
            media_types(&["application/json", "text/json"])
        } else {
            media_types(&[
                "application/json",
                "text/json",
                "application/json+simple",
                "text/json+simple",
            ])
        };
        Self {
            config,
            context: BeanContext::new(),
            validate_end: config.strict(),
            media_types,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: BeanContext) -> Self {
        self.context = context;
        self
    }

    /// Rejects input with anything but whitespace, comments or a `;`
    /// after the parsed value.
    #[must_use]
    pub fn with_validate_end(mut self, validate_end: bool) -> Self {
        self.validate_end = validate_end;
        self
    }

    #[must_use]
    pub fn with_media_types(mut self, media_types: Vec<MediaType>) -> Self {
        self.media_types = media_types;
        self
    }

    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[inline]
    pub fn context(&self) -> &BeanContext {
        &self.context
    }

    fn finish(&self, session: &mut JsonParserSession<'_>) -> Result<(), ParseError> {
        match self.validate_end {
            true => session.validate_end(),
            false => Ok(()),
        }
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTypeHandler for JsonParser {
    fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }
}

impl Parser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse_value(&self, input: ParserInput<'_>, ty: &TypeHandle) -> Result<Value, ParseError> {
        let Some(text) = input.read_text(&self.config)? else {
            return Ok(Value::Null);
        };
        let mut session = JsonParserSession::new(&text, &self.config, &self.context);
        let value = session.parse_anything(ty, None)?;
        self.finish(&mut session)?;
        Ok(value)
    }

    fn parse_into_map(
        &self,
        input: ParserInput<'_>,
        map: &MapRef,
        key: &TypeHandle,
        value: &TypeHandle,
    ) -> Result<MapRef, ParseError> {
        if let Some(text) = input.read_text(&self.config)? {
            let mut session = JsonParserSession::new(&text, &self.config, &self.context);
            session.parse_into_map(map, key, value, None)?;
            self.finish(&mut session)?;
        }
        Ok(map.clone())
    }

    fn parse_into_collection(
        &self,
        input: ParserInput<'_>,
        list: &ListRef,
        element: &TypeHandle,
    ) -> Result<ListRef, ParseError> {
        if let Some(text) = input.read_text(&self.config)? {
            let mut session = JsonParserSession::new(&text, &self.config, &self.context);
            session.parse_into_collection(list, element, None)?;
            self.finish(&mut session)?;
        }
        Ok(list.clone())
    }
}

// -----------------------------------------------------------------------------
// Tests
