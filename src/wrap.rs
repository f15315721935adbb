// Wrapping logic: turning raw stored values into facade-aware views.
//
// Nested maps become smart maps scoped to the sub-entity, vectors become
// lazy restartable sequences, sets are wrapped eagerly (membership and
// hashing need realized elements), scalars pass through unchanged. Wrapping
// is never cached: each access re-wraps from raw storage, so wrapper
// identity is unstable while wrapper content is stable.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexSet;

use crate::env::EnvConfig;
use crate::smart_map::SmartMap;
use crate::value::Value;

/// A facade-aware view of one stored value.
#[derive(Debug, Clone)]
pub enum Wrapped {
    /// Scalar passed through unchanged.
    Value(Value),
    /// Nested map promoted to its own smart map.
    Map(SmartMap),
    /// Lazy view over a stored vector.
    Seq(WrapSeq),
    /// Eagerly wrapped set.
    Set(IndexSet<Wrapped>),
}

/// Recursively wrap a raw value for the given configuration.
pub fn wrap(config: &EnvConfig, value: Value) -> Wrapped {
    match value {
        Value::Map(m) => Wrapped::Map(SmartMap::with_context(config.clone(), m)),
        Value::Vector(v) => Wrapped::Seq(WrapSeq::new(config.clone(), v)),
        Value::Set(s) => Wrapped::Set(s.into_iter().map(|item| wrap(config, item)).collect()),
        other => Wrapped::Value(other),
    }
}

impl Wrapped {
    pub fn type_name(&self) -> &'static str {
        match self {
            Wrapped::Value(v) => v.type_name(),
            Wrapped::Map(_) => "map",
            Wrapped::Seq(_) => "vector",
            Wrapped::Set(_) => "set",
        }
    }

    pub fn as_map(&self) -> Option<&SmartMap> {
        match self {
            Wrapped::Map(sm) => Some(sm),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&WrapSeq> {
        match self {
            Wrapped::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Wrapped::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Wrapped::Value(Value::Nil))
    }

    /// Collapse back to a raw value. Nested smart maps contribute their live
    /// cache content, which may have grown beyond the originally stored map.
    pub fn to_value(&self) -> Value {
        match self {
            Wrapped::Value(v) => v.clone(),
            Wrapped::Map(sm) => Value::Map(sm.to_map()),
            Wrapped::Seq(seq) => Value::Vector(seq.items().to_vec()),
            Wrapped::Set(s) => Value::Set(s.iter().map(Wrapped::to_value).collect()),
        }
    }
}

impl PartialEq for Wrapped {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Wrapped::Value(a), Wrapped::Value(b)) => a == b,
            (Wrapped::Map(a), Wrapped::Map(b)) => a == b,
            (Wrapped::Seq(a), Wrapped::Seq(b)) => a == b,
            (Wrapped::Set(a), Wrapped::Set(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Wrapped {}

fn wrapped_digest(item: &Wrapped) -> u64 {
    let mut h = DefaultHasher::new();
    item.hash(&mut h);
    h.finish()
}

impl Hash for Wrapped {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Wrapped::Value(v) => v.hash(state),
            Wrapped::Map(sm) => sm.hash(state),
            Wrapped::Seq(seq) => seq.hash(state),
            Wrapped::Set(s) => {
                // order-insensitive, matching IndexSet content equality
                let digest = s
                    .iter()
                    .fold(0u64, |acc, item| acc.wrapping_add(wrapped_digest(item)));
                digest.hash(state);
            }
        }
    }
}

/// Lazy, restartable sequence of wrapped elements. Holds the raw elements
/// and wraps each one on demand; `iter()` starts over from the beginning.
#[derive(Debug, Clone)]
pub struct WrapSeq {
    config: EnvConfig,
    items: Arc<Vec<Value>>,
}

impl WrapSeq {
    pub fn new(config: EnvConfig, items: Vec<Value>) -> Self {
        WrapSeq {
            config,
            items: Arc::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The raw, unwrapped elements.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<Wrapped> {
        self.items.get(index).map(|v| wrap(&self.config, v.clone()))
    }

    pub fn iter(&self) -> WrapSeqIter<'_> {
        WrapSeqIter { seq: self, index: 0 }
    }
}

impl PartialEq for WrapSeq {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for WrapSeq {}

impl Hash for WrapSeq {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state);
    }
}

impl<'a> IntoIterator for &'a WrapSeq {
    type Item = Wrapped;
    type IntoIter = WrapSeqIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct WrapSeqIter<'a> {
    seq: &'a WrapSeq,
    index: usize,
}

impl<'a> Iterator for WrapSeqIter<'a> {
    type Item = Wrapped;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.seq.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.seq.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for WrapSeqIter<'a> {}
