// Runtime value system for attribute maps.
// Values are fully comparable and hashable so they can live in sets and be
// used for content-based equality of whole attribute trees.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::attr::Attr;

/// The attribute-tree representation: an insertion-ordered map from attribute
/// to value. Used for both the source context and the live cache tree.
pub type MapRepr = IndexMap<Attr, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    String(String),
    Keyword(Attr),
    Vector(Vec<Value>),
    Set(IndexSet<Value>),
    Map(MapRepr),
}

impl Value {
    pub fn float(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }

    pub fn string(s: &str) -> Self {
        Value::String(s.to_string())
    }

    pub fn keyword(s: &str) -> Self {
        Value::Keyword(Attr::new(s))
    }

    pub fn map(pairs: impl IntoIterator<Item = (Attr, Value)>) -> Self {
        Value::Map(pairs.into_iter().collect())
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(items.into_iter().collect())
    }

    pub fn vector(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Vector(items.into_iter().collect())
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Vector(_) => "vector",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    pub fn as_map(&self) -> Option<&MapRepr> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

fn entry_digest<T: Hash>(entry: &T) -> u64 {
    let mut h = DefaultHasher::new();
    entry.hash(&mut h);
    h.finish()
}

/// Order-insensitive digest of a map's entries. Equal contents hash equally
/// no matter the insertion order.
pub(crate) fn map_digest(map: &MapRepr) -> u64 {
    map.iter()
        .fold(0u64, |acc, entry| acc.wrapping_add(entry_digest(&entry)))
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Float(f) => f.hash(state),
            Value::String(s) => s.hash(state),
            Value::Keyword(k) => k.hash(state),
            Value::Vector(v) => v.hash(state),
            Value::Set(s) => {
                let digest = s
                    .iter()
                    .fold(0u64, |acc, item| acc.wrapping_add(entry_digest(item)));
                digest.hash(state);
            }
            Value::Map(m) => map_digest(m).hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Keyword(k) => write!(f, "{}", k),
            Value::Vector(v) => {
                let items: Vec<String> = v.iter().map(|item| format!("{}", item)).collect();
                write!(f, "[{}]", items.join(" "))
            }
            Value::Set(s) => {
                let items: Vec<String> = s.iter().map(|item| format!("{}", item)).collect();
                write!(f, "#{{{}}}", items.join(" "))
            }
            Value::Map(m) => {
                let items: Vec<String> =
                    m.iter().map(|(k, v)| format!("{} {}", k, v)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}
