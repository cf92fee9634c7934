use alloc::vec::Vec;
use std::io::{self, BufWriter};

use marshal_codec::{
    BeanContext, MediaType, MediaTypeHandler, SerializeError, Serializer, SerializerConfig,
    SerializerSession,
};
use marshal_reflect::{TypeHandle, Value};

use crate::writer::JsonWriter;

fn media_types(names: &[&str]) -> Vec<MediaType> {
    names
        .iter()
        .filter_map(|name| MediaType::parse(name).ok())
        .collect()
}

// -----------------------------------------------------------------------------
// JsonSerializer

/// Serializes values to JSON.
///
/// # Examples
///
/// ```
/// use marshal_codec::Serializer;
/// use marshal_json::JsonSerializer;
/// use marshal_reflect::{MapRef, Value};
///
/// let map: MapRef = [("a", Value::from(1)), ("b", Value::collection([true]))]
///     .into_iter()
///     .collect();
///
/// let json = JsonSerializer::new().serialize_to_string(&Value::Map(map.clone())).unwrap();
/// assert_eq!(json, r#"{"a":1,"b":[true]}"#);
///
/// let json = JsonSerializer::simple().serialize_to_string(&Value::Map(map)).unwrap();
/// assert_eq!(json, "{a:1,b:[true]}");
/// ```
pub struct JsonSerializer {
    config: SerializerConfig,
    context: BeanContext,
    media_types: Vec<MediaType>,
}

impl JsonSerializer {
    /// Compact JSON for `application/json` and `text/json`.
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    /// Indented JSON.
    pub fn readable() -> Self {
        Self::with_config(SerializerConfig::default().with_use_whitespace(true))
    }

    /// Simplified JSON: single quotes, bare attribute names. Served as
    /// `application/json+simple` and `text/json+simple`.
    pub fn simple() -> Self {
        Self::with_config(
            SerializerConfig::default()
                .with_simple_mode(true)
                .with_quote_char('\''),
        )
    }

    /// Indented simplified JSON.
    pub fn simple_readable() -> Self {
        Self::with_config(
            SerializerConfig::default()
                .with_simple_mode(true)
                .with_quote_char('\'')
                .with_use_whitespace(true),
        )
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        let media_types = if config.simple_mode() {
            media_types(&["application/json+simple", "text/json+simple"])
        } else {
            media_types(&["application/json", "text/json"])
        };
        Self {
            config,
            context: BeanContext::new(),
            media_types,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: BeanContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_media_types(mut self, media_types: Vec<MediaType>) -> Self {
        self.media_types = media_types;
        self
    }

    #[inline]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    #[inline]
    pub fn context(&self) -> &BeanContext {
        &self.context
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTypeHandler for JsonSerializer {
    fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }
}

impl Serializer for JsonSerializer {
    fn serialize_as(
        &self,
        value: &Value,
        expected: Option<&TypeHandle>,
        out: &mut dyn io::Write,
    ) -> Result<(), SerializeError> {
        let mut writer = JsonWriter::new(BufWriter::new(out), &self.config);
        SerializerSession::new(&self.config, &self.context).serialize(&mut writer, value, expected)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use marshal_codec::{
        MediaTypeHandler, RecursionPolicy, SerializeError, Serializer, SerializerConfig,
        SerializerGroup, TraverseConfig, UriContext, UriResolution, UriResolver,
    };
    use marshal_reflect::{ListRef, MapRef, Value};

    use super::JsonSerializer;
    use crate::testing::{Dog, Person, person};

    fn to_json(serializer: &JsonSerializer, value: &Value) -> String {
        serializer.serialize_to_string(value).unwrap()
    }

    #[test]
    fn emits_valid_json() {
        let map: MapRef = [
            ("text", Value::from("line\nbreak \"quoted\" \u{2}")),
            ("n", Value::from(-12)),
            ("f", Value::from(0.5)),
            ("nested", Value::collection([Value::Null, Value::from(false)])),
        ]
        .into_iter()
        .collect();
        let json = to_json(&JsonSerializer::readable(), &Value::Map(map));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["text"], "line\nbreak \"quoted\" \u{2}");
        assert_eq!(parsed["n"], -12);
        assert_eq!(parsed["f"], 0.5);
        assert_eq!(parsed["nested"], serde_json::json!([null, false]));
    }

    #[test]
    fn readable_layout() {
        let map: MapRef = [("a", Value::from(1)), ("b", Value::collection([1, 2]))]
            .into_iter()
            .collect();
        let json = to_json(&JsonSerializer::readable(), &Value::Map(map));
        assert_eq!(json, "{\n\t\"a\": 1,\n\t\"b\": [\n\t\t1,\n\t\t2\n\t]\n}");
    }

    #[test]
    fn simple_mode() {
        let json = to_json(&JsonSerializer::simple(), &person("Ann", "/people/ann"));
        assert_eq!(json, "{name:'Ann',home:'/people/ann'}");
    }

    #[test]
    fn cycle_becomes_null() {
        let map = MapRef::new();
        map.insert("name", "a");
        map.insert("self", map.clone());
        let json = to_json(&JsonSerializer::new(), &Value::Map(map.clone()));
        assert_eq!(json, r#"{"name":"a","self":null}"#);

        let failing = JsonSerializer::with_config(SerializerConfig::default().with_traverse(
            TraverseConfig::default().with_recursion(RecursionPolicy::Fail),
        ));
        let err = failing.serialize_to_string(&Value::Map(map)).unwrap_err();
        assert!(matches!(err, SerializeError::Recursion(_)));
    }

    #[test]
    fn deep_nesting_fails() {
        let root = ListRef::new();
        let mut tail = root.clone();
        for _ in 0..500 {
            let next = ListRef::new();
            tail.push(next.clone());
            tail = next;
        }
        let err = JsonSerializer::new()
            .serialize_to_string(&Value::Collection(root))
            .unwrap_err();
        assert!(err.to_string().starts_with("Depth too deep"));
    }

    #[test]
    fn discriminators_and_uris() {
        let serializer = JsonSerializer::with_config(
            SerializerConfig::default()
                .with_add_bean_types(true)
                .with_uri_resolver(UriResolver::new(
                    UriResolution::RootRelative,
                    UriContext {
                        authority: None,
                        context_root: Some("/ctx".into()),
                    },
                )),
        );
        let ann = Person {
            name: String::from("Ann"),
            home: String::from("people/ann"),
            pet: Some(Value::bean(Dog::new("Rex"))),
        };
        let json = to_json(&serializer, &Value::bean(ann));
        assert_eq!(
            json,
            r#"{"name":"Ann","home":"/ctx/people/ann","pet":{"_type":"dog","name":"Rex","barks":true}}"#
        );
    }

    #[test]
    fn group_dispatch() {
        let group = SerializerGroup::builder()
            .add([Arc::new(JsonSerializer::new()) as Arc<dyn Serializer>])
            .add([Arc::new(JsonSerializer::simple()) as Arc<dyn Serializer>])
            .build();
        let hit = group.resolve("text/json+simple").unwrap();
        assert_eq!(hit.handler().media_types()[0].essence(), "application/json+simple");

        let hit = group.resolve("application/json;q=0.8, text/html").unwrap();
        let json = hit.handler().serialize_to_string(&Value::collection(["x"])).unwrap();
        assert_eq!(json, r#"["x"]"#);
    }
}
