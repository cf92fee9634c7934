//! `serde` support for [`Value`].
//!
//! Serializing maps beans to string-keyed maps of their properties and
//! objects to their text. Deserializing produces only untyped values:
//! maps, collections and scalars. It is the bridge to serde formats that
//! have no marshalling session of their own; typed parsing goes through
//! a `Parser`.

use alloc::string::String;
use core::fmt;

use serde_core::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_core::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::{ListRef, MapRef, Number, StreamRef, Value};

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(Number::Integer(v)) => serializer.serialize_i64(*v),
            Self::Number(Number::Float(v)) => serializer.serialize_f64(*v),
            Self::Char(v) => serializer.serialize_char(*v),
            Self::String(v) | Self::Uri(v) => serializer.serialize_str(v),
            Self::Map(map) => {
                let entries = map.entries();
                let mut state = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in &entries {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
            Self::Collection(list) | Self::Array(list) => {
                let items = list.to_vec();
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    state.serialize_element(item)?;
                }
                state.end()
            }
            Self::Bean(bean) => {
                let properties = bean.properties();
                let mut state = serializer.serialize_map(Some(properties.len()))?;
                for property in &properties {
                    let value = property.value.as_ref().map_err(S::Error::custom)?;
                    state.serialize_entry(property.meta.name(), value)?;
                }
                state.end()
            }
            Self::Stream(stream) => serializer.serialize_bytes(stream.as_bytes()),
            Self::Object(object) => serializer.serialize_str(&object.to_text()),
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(match i64::try_from(v) {
            Ok(v) => Value::from(v),
            Err(_) => Value::from(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<Value, E> {
        Ok(Value::Char(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Stream(StreamRef::new(v)))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let list = ListRef::new();
        while let Some(item) = seq.next_element::<Value>()? {
            list.push(item);
        }
        Ok(Value::Collection(list))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let map = MapRef::new();
        while let Some((key, value)) = access.next_entry::<Value, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::value::{ListRef, MapRef, Value};

    fn sample() -> Value {
        let map = MapRef::new();
        map.insert("name", "ada");
        map.insert("age", 36);
        map.insert("ratio", 0.5);
        map.insert("tags", Value::collection(["x", "y"]));
        map.insert("none", Value::Null);
        Value::Map(map)
    }

    #[test]
    fn json_bridge() {
        let text = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            text,
            r#"{"name":"ada","age":36,"ratio":0.5,"tags":["x","y"],"none":null}"#
        );

        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Reading {
        sensor: String,
        level: i32,
        scale: f64,
        flags: [bool; 2],
        note: Option<String>,
    }

    #[test]
    fn derived_types_pass_through_values() {
        let reading = Reading {
            sensor: "t1".into(),
            level: -4,
            scale: 1.5,
            flags: [true, false],
            note: None,
        };
        let text = serde_json::to_string(&reading).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("sensor"), Some(Value::from("t1")));
        assert_eq!(map.get("level"), Some(Value::from(-4)));
        assert_eq!(map.get("scale"), Some(Value::from(1.5)));
        assert_eq!(map.get("flags"), Some(Value::collection([true, false])));
        assert_eq!(map.get("note"), Some(Value::Null));

        let again = serde_json::to_string(&value).unwrap();
        assert_eq!(again, text);
        let back: Reading = serde_json::from_str(&again).unwrap();
        assert_eq!(back, reading);
    }

    #[test]
    fn ron_bridge() {
        let list = ListRef::new();
        list.push(1);
        list.push("two");
        let text: String = ron::to_string(&Value::Collection(list.clone())).unwrap();
        let back: Value = ron::from_str(&text).unwrap();
        assert_eq!(back, Value::Collection(list));
    }
}
