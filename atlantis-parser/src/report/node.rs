//! Structured document nodes
//!
//!     Parsers produce a small tree of [Node]s that knows nothing about JSON or any other
//!     wire format. Serialization happens once, at the end, through `serde`.
//!
//!     Objects keep their fields in insertion order. Parsers that produce several sibling
//!     fields at once (a region header yields terrain, coordinates, province, ...) return
//!     [Fields], a plain list of keys, and the caller splices it into the object it is
//!     building with [ObjectBuilder::splice]. Nothing ever nests a "group" node, so there is
//!     no wrapper that could leak into the output.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};

/// A document tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Object(Vec<Key>),
    Array(Vec<Node>),
    /// A single named value outside of an object. Serializes as a one-field object.
    Key(Box<Key>),
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
}

/// A named child of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub value: Node,
}

/// Sibling fields produced together, to be spliced into a parent object.
pub type Fields = Vec<Key>;

impl Key {
    pub fn new(name: impl Into<String>, value: impl Into<Node>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Node {
    pub fn str(value: impl Into<String>) -> Self {
        Node::Str(value.into())
    }

    /// Look up a field of an object (or the value of a standalone key).
    pub fn get(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Object(fields) => fields.iter().find(|k| k.name == name).map(|k| &k.value),
            Node::Key(key) if key.name == name => Some(&key.value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Field names of an object, in order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Node::Object(fields) => fields.iter().map(|k| k.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Take the fields out of an object node.
    pub fn into_fields(self) -> Option<Fields> {
        match self {
            Node::Object(fields) => Some(fields),
            Node::Key(key) => Some(vec![*key]),
            _ => None,
        }
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Str(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

impl From<Key> for Node {
    fn from(key: Key) -> Self {
        Node::Key(Box::new(key))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Node::Null)
    }
}

/// Incremental builder for object nodes.
#[derive(Debug, Default, Clone)]
pub struct ObjectBuilder {
    fields: Fields,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, name: &str, value: impl Into<Node>) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a field only when `value` is present.
    pub fn maybe<T: Into<Node>>(mut self, name: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    /// Append sibling fields directly, without nesting them.
    pub fn splice(mut self, fields: Fields) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Node>) {
        self.fields.push(Key::new(name, value));
    }

    /// The array stored under `name`, created empty on first use.
    pub fn array_mut(&mut self, name: &str) -> &mut Vec<Node> {
        let index = match self.fields.iter().position(|k| k.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(Key::new(name, Node::Array(Vec::new())));
                self.fields.len() - 1
            }
        };
        let slot = &mut self.fields[index].value;
        if !matches!(slot, Node::Array(_)) {
            *slot = Node::Array(Vec::new());
        }
        match slot {
            Node::Array(items) => items,
            _ => unreachable!("slot was just made an array"),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|k| k.name == name)
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn build(self) -> Node {
        Node::Object(self.fields)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for key in fields {
                    map.serialize_entry(&key.name, &key.value)?;
                }
                map.end()
            }
            Node::Key(key) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&key.name, &key.value)?;
                map.end()
            }
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Int(v) => serializer.serialize_i64(*v),
            Node::Str(v) => serializer.serialize_str(v),
            Node::Bool(v) => serializer.serialize_bool(*v),
            Node::Null => serializer.serialize_unit(),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|k| (k.name, Value::from(k.value)))
                    .collect::<Map<_, _>>(),
            ),
            Node::Key(key) => {
                let mut map = Map::new();
                map.insert(key.name, Value::from(key.value));
                Value::Object(map)
            }
            Node::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Int(v) => Value::from(v),
            Node::Str(v) => Value::String(v),
            Node::Bool(v) => Value::Bool(v),
            Node::Null => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_preserves_order() {
        let node = ObjectBuilder::new()
            .field("b", 1)
            .field("a", "x")
            .maybe("skipped", None::<i64>)
            .maybe("c", Some(true))
            .build();
        assert_eq!(node.keys(), vec!["b", "a", "c"]);
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"b":1,"a":"x","c":true}"#
        );
    }

    #[test]
    fn test_value_keeps_field_order() {
        let node = ObjectBuilder::new()
            .field("faction", 3)
            .field("date", ObjectBuilder::new().field("month", "May").field("year", 1).build())
            .field("attitudes", Node::Array(vec![]))
            .build();
        let value = Value::from(node);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["faction", "date", "attitudes"]);
        assert_eq!(value.to_string(), r#"{"faction":3,"date":{"month":"May","year":1},"attitudes":[]}"#);
    }

    #[test]
    fn test_splice_flattens_fields() {
        let header: Fields = vec![Key::new("terrain", "forest"), Key::new("province", "Mapa")];
        let node = ObjectBuilder::new()
            .splice(header)
            .field("units", Node::Array(vec![]))
            .build();
        assert_eq!(node.keys(), vec!["terrain", "province", "units"]);
        assert_eq!(
            Value::from(node),
            json!({"terrain": "forest", "province": "Mapa", "units": []})
        );
    }

    #[test]
    fn test_standalone_key_serializes_as_single_field_object() {
        let node = Node::from(Key::new("amount", 5));
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"amount":5}"#);
        assert_eq!(node.get("amount").and_then(Node::as_i64), Some(5));
    }

    #[test]
    fn test_array_mut_creates_and_reuses() {
        let mut builder = ObjectBuilder::new();
        builder.array_mut("regions").push(Node::Int(1));
        builder.array_mut("regions").push(Node::Int(2));
        let node = builder.build();
        assert_eq!(node.keys(), vec!["regions"]);
        assert_eq!(node.get("regions").and_then(Node::as_array).map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_null_and_option_conversion() {
        assert_eq!(Node::from(None::<i64>), Node::Null);
        assert_eq!(Node::from(Some("x")), Node::str("x"));
        assert_eq!(serde_json::to_string(&Node::Null).unwrap(), "null");
    }
}
