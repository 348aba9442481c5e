use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::String(value) => write!(f, "{}", value),
        }
    }
}

/// The shape of a configuration node, used for expected-kind checks
/// when dispatching to condition providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    List,
    Map,
    /// Matches any shape.
    Any,
}

impl NodeKind {
    pub fn matches(&self, other: NodeKind) -> bool {
        *self == NodeKind::Any || *self == other
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Scalar => write!(f, "scalar"),
            NodeKind::List => write!(f, "list"),
            NodeKind::Map => write!(f, "map"),
            NodeKind::Any => write!(f, "any"),
        }
    }
}

/// An externally-supplied configuration tree.
///
/// The engine only ever reads these. Maps are stored as key/value pairs so
/// that the author's source order stays observable when a multi-key map is
/// turned into a composed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Scalar(Scalar),
    List(Vec<ConfigNode>),
    Map(Vec<(String, ConfigNode)>),
}

impl ConfigNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ConfigNode::Scalar(_) => NodeKind::Scalar,
            ConfigNode::List(_) => NodeKind::List,
            ConfigNode::Map(_) => NodeKind::Map,
        }
    }

    /// Direct child lookup by key. Only meaningful on maps.
    pub fn entry(&self, key: &str) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Map(entries) => entries
                .iter()
                .find(|(entry_key, _)| entry_key == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Walks a dotted path (e.g. `"custom-item.rarity"`) through nested maps.
    pub fn get(&self, path: &str) -> Option<&ConfigNode> {
        let mut node = self;
        for part in path.split('.') {
            node = node.entry(part)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Scalar(Scalar::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNode::Scalar(Scalar::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigNode::Scalar(Scalar::Int(value)) => Some(*value as f64),
            ConfigNode::Scalar(Scalar::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn items(&self) -> &[ConfigNode] {
        match self {
            ConfigNode::List(items) => items,
            _ => &[],
        }
    }

    pub fn entries(&self) -> &[(String, ConfigNode)] {
        match self {
            ConfigNode::Map(entries) => entries,
            _ => &[],
        }
    }

    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(ConfigNode::as_str)
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path).and_then(ConfigNode::as_bool).unwrap_or(default)
    }

    /// Reads a field authored as either a single string or a list of strings.
    pub fn get_string_list(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(ConfigNode::Scalar(scalar)) => vec![scalar.to_string()],
            Some(ConfigNode::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    ConfigNode::Scalar(scalar) => Some(scalar.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the first string-or-list value among several accepted
    /// spellings of the same field. Paths holding some other shape are
    /// skipped so a later spelling can still match.
    pub fn string_or_list(&self, paths: &[&str]) -> Vec<String> {
        for path in paths {
            if matches!(self.get(path), Some(ConfigNode::Scalar(_) | ConfigNode::List(_))) {
                return self.get_string_list(path);
            }
        }
        Vec::new()
    }
}

// Display is only used in diagnostics, keep it compact.
impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigNode::Scalar(scalar) => write!(f, "{}", scalar),
            ConfigNode::List(items) => write!(f, "<list of {}>", items.len()),
            ConfigNode::Map(entries) => write!(f, "<map of {}>", entries.len()),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = ConfigNode;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar, list, or map")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(ConfigNode::Scalar(Scalar::Bool(value)))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(ConfigNode::Scalar(Scalar::Int(value)))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(ConfigNode::Scalar(Scalar::Int(value as i64)))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(ConfigNode::Scalar(Scalar::Float(value)))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(ConfigNode::Scalar(Scalar::String(value.to_string())))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(ConfigNode::Scalar(Scalar::String(value)))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(ConfigNode::List(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, ConfigNode>()? {
                    entries.push((key, value));
                }
                Ok(ConfigNode::Map(entries))
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(value: serde_json::Value) -> ConfigNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dotted_path_lookup() {
        let root = node(serde_json::json!({
            "custom-item": { "rarity": 3 }
        }));
        assert_eq!(root.get("custom-item.rarity").and_then(ConfigNode::as_i64), Some(3));
        assert!(root.get("custom-item.missing").is_none());
        assert!(root.contains("custom-item"));
    }

    #[test]
    fn test_string_or_list_coercion() {
        let single = node(serde_json::json!({ "commands": "eco give %player% 10" }));
        assert_eq!(single.get_string_list("commands"), vec!["eco give %player% 10"]);

        let many = node(serde_json::json!({ "commands": ["first", "second"] }));
        assert_eq!(many.get_string_list("commands"), vec!["first", "second"]);

        let aliased = node(serde_json::json!({ "console-command": "one" }));
        let found = aliased.string_or_list(&["console-commands", "console-command"]);
        assert_eq!(found, vec!["one"]);
    }

    #[test]
    fn test_string_or_list_skips_non_string_shapes() {
        // A map under the first spelling must not shadow a later spelling
        // that actually holds commands.
        let shadowed = node(serde_json::json!({
            "console-commands": { "nested": 1 },
            "console-command": "one"
        }));
        let found = shadowed.string_or_list(&["console-commands", "console-command"]);
        assert_eq!(found, vec!["one"]);
    }

    #[test]
    fn test_map_preserves_source_order() {
        let root = node(serde_json::json!({
            "b-first": 1,
            "a-second": 2
        }));
        let keys: Vec<&str> = root.entries().iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["b-first", "a-second"]);
    }

    #[test]
    fn test_kind_matching() {
        assert!(NodeKind::Any.matches(NodeKind::Map));
        assert!(NodeKind::Scalar.matches(NodeKind::Scalar));
        assert!(!NodeKind::Scalar.matches(NodeKind::List));
    }
}
