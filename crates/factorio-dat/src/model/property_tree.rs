//! PropertyTree values: the generic recursive settings format.

use std::fmt;

use rustc_hash::FxHashMap;

/// Wire tag of each PropertyTree variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyTreeType {
    None = 0,
    Bool = 1,
    Number = 2,
    String = 3,
    List = 4,
    Dictionary = 5,
    SignedInteger = 6,
    UnsignedInteger = 7,
}

impl PropertyTreeType {
    /// Creates a PropertyTreeType from its wire representation.
    pub fn from_u8(v: u8) -> Option<PropertyTreeType> {
        match v {
            0 => Some(PropertyTreeType::None),
            1 => Some(PropertyTreeType::Bool),
            2 => Some(PropertyTreeType::Number),
            3 => Some(PropertyTreeType::String),
            4 => Some(PropertyTreeType::List),
            5 => Some(PropertyTreeType::Dictionary),
            6 => Some(PropertyTreeType::SignedInteger),
            7 => Some(PropertyTreeType::UnsignedInteger),
            _ => None,
        }
    }
}

/// One PropertyTree node. Trees are acyclic and fully owned.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyTree {
    #[default]
    None,
    Bool(bool),
    /// IEEE-754 double.
    Number(f64),
    String(String),
    List(Vec<PropertyTree>),
    Dict(PropertyDict),
    SignedInteger(i64),
    UnsignedInteger(u64),
}

impl PropertyTree {
    /// Returns the wire tag for this value.
    pub fn tree_type(&self) -> PropertyTreeType {
        match self {
            PropertyTree::None => PropertyTreeType::None,
            PropertyTree::Bool(_) => PropertyTreeType::Bool,
            PropertyTree::Number(_) => PropertyTreeType::Number,
            PropertyTree::String(_) => PropertyTreeType::String,
            PropertyTree::List(_) => PropertyTreeType::List,
            PropertyTree::Dict(_) => PropertyTreeType::Dictionary,
            PropertyTree::SignedInteger(_) => PropertyTreeType::SignedInteger,
            PropertyTree::UnsignedInteger(_) => PropertyTreeType::UnsignedInteger,
        }
    }

    /// Short lowercase name of the variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyTree::None => "none",
            PropertyTree::Bool(_) => "bool",
            PropertyTree::Number(_) => "number",
            PropertyTree::String(_) => "string",
            PropertyTree::List(_) => "list",
            PropertyTree::Dict(_) => "dictionary",
            PropertyTree::SignedInteger(_) => "signed integer",
            PropertyTree::UnsignedInteger(_) => "unsigned integer",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PropertyTree::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyTree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric value of any numeric variant, widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyTree::Number(n) => Some(*n),
            PropertyTree::SignedInteger(n) => Some(*n as f64),
            PropertyTree::UnsignedInteger(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyTree::SignedInteger(n) => Some(*n),
            PropertyTree::UnsignedInteger(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyTree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyTree]> {
        match self {
            PropertyTree::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PropertyDict> {
        match self {
            PropertyTree::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` if this is a dictionary.
    pub fn get(&self, key: &str) -> Option<&PropertyTree> {
        self.as_dict().and_then(|dict| dict.get(key))
    }

    /// Follows a chain of dictionary keys.
    pub fn path(&self, keys: &[&str]) -> Option<&PropertyTree> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }
}

impl From<bool> for PropertyTree {
    fn from(v: bool) -> Self {
        PropertyTree::Bool(v)
    }
}

impl From<f64> for PropertyTree {
    fn from(v: f64) -> Self {
        PropertyTree::Number(v)
    }
}

impl From<i64> for PropertyTree {
    fn from(v: i64) -> Self {
        PropertyTree::SignedInteger(v)
    }
}

impl From<u64> for PropertyTree {
    fn from(v: u64) -> Self {
        PropertyTree::UnsignedInteger(v)
    }
}

impl From<&str> for PropertyTree {
    fn from(v: &str) -> Self {
        PropertyTree::String(v.to_owned())
    }
}

impl From<String> for PropertyTree {
    fn from(v: String) -> Self {
        PropertyTree::String(v)
    }
}

impl From<Vec<PropertyTree>> for PropertyTree {
    fn from(v: Vec<PropertyTree>) -> Self {
        PropertyTree::List(v)
    }
}

impl From<PropertyDict> for PropertyTree {
    fn from(v: PropertyDict) -> Self {
        PropertyTree::Dict(v)
    }
}

/// String-keyed dictionary that keeps insertion order and unique keys.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// its original position.
#[derive(Clone, Default, PartialEq)]
pub struct PropertyDict {
    entries: Vec<(String, PropertyTree)>,
    index: FxHashMap<String, usize>,
}

impl PropertyDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyTree) -> Option<PropertyTree> {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&PropertyTree> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropertyTree> {
        let slot = *self.index.get(key)?;
        Some(&mut self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyTree)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &PropertyTree> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl fmt::Debug for PropertyDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyTree)> for PropertyDict {
    fn from_iter<I: IntoIterator<Item = (K, PropertyTree)>>(iter: I) -> Self {
        let mut dict = PropertyDict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

impl IntoIterator for PropertyDict {
    type Item = (String, PropertyTree);
    type IntoIter = std::vec::IntoIter<(String, PropertyTree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// JSON
// =============================================================================

#[cfg(feature = "json")]
impl PropertyTree {
    /// Renders the tree as JSON.
    ///
    /// Non-finite numbers become `null`. Dictionaries keep insertion order.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            PropertyTree::None => Json::Null,
            PropertyTree::Bool(b) => Json::Bool(*b),
            PropertyTree::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            PropertyTree::String(s) => Json::String(s.clone()),
            PropertyTree::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            PropertyTree::Dict(dict) => Json::Object(
                dict.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_json()))
                    .collect(),
            ),
            PropertyTree::SignedInteger(n) => Json::from(*n),
            PropertyTree::UnsignedInteger(n) => Json::from(*n),
        }
    }

    /// Builds a tree from JSON. Every JSON number becomes [`PropertyTree::Number`].
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => PropertyTree::None,
            Json::Bool(b) => PropertyTree::Bool(*b),
            Json::Number(n) => PropertyTree::Number(n.as_f64().unwrap_or(0.0)),
            Json::String(s) => PropertyTree::String(s.clone()),
            Json::Array(items) => PropertyTree::List(items.iter().map(Self::from_json).collect()),
            Json::Object(map) => PropertyTree::Dict(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}
