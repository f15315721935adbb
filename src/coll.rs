// General-purpose collection helpers used by the cache-fill path and exposed
// for callers building contexts and resolver outputs.

use std::hash::Hash;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::attr::Attr;
use crate::error::{ResolveError, ResolveResult};
use crate::value::{MapRepr, Value};

/// Keep the first item seen for each key, preserving order.
pub fn dedupe_by<T, K, F>(items: impl IntoIterator<Item = T>, key_fn: F) -> Vec<T>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    items.into_iter().unique_by(key_fn).collect()
}

/// Index items by key; a later item wins over an earlier one with the same key.
pub fn index_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> IndexMap<K, T>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut out = IndexMap::new();
    for item in items {
        out.insert(key_fn(&item), item);
    }
    out
}

/// Transform every key of a map.
pub fn map_keys(map: &MapRepr, mut f: impl FnMut(&Attr) -> Attr) -> MapRepr {
    map.iter().map(|(k, v)| (f(k), v.clone())).collect()
}

/// Transform every value of a map.
pub fn map_vals(map: &MapRepr, mut f: impl FnMut(&Value) -> Value) -> MapRepr {
    map.iter().map(|(k, v)| (k.clone(), f(v))).collect()
}

/// Conjoin an item onto a collection value. Vectors append, sets insert,
/// nil starts a fresh vector.
pub fn conj(coll: Value, item: Value) -> ResolveResult<Value> {
    match coll {
        Value::Nil => Ok(Value::Vector(vec![item])),
        Value::Vector(mut v) => {
            v.push(item);
            Ok(Value::Vector(v))
        }
        Value::Set(mut s) => {
            s.insert(item);
            Ok(Value::Set(s))
        }
        other => Err(ResolveError::TypeMismatch {
            expected: "vector, set or nil".to_string(),
            actual: other.type_name().to_string(),
            operation: "conj".to_string(),
        }),
    }
}

/// Recursive growing merge: nested maps merge recursively, sets union, and a
/// nil on the right never clobbers an existing value. Everything else takes
/// the right side. Keys are only ever added, never removed - this is the
/// merge discipline cache fills rely on.
pub fn merge_grow(left: &MapRepr, right: &MapRepr) -> MapRepr {
    let mut out = left.clone();
    for (k, rv) in right {
        let merged = match out.get(k) {
            Some(lv) => grow_value(lv, rv),
            None => rv.clone(),
        };
        out.insert(k.clone(), merged);
    }
    out
}

fn grow_value(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Map(l), Value::Map(r)) => Value::Map(merge_grow(l, r)),
        (Value::Set(l), Value::Set(r)) => Value::Set(l.union(r).cloned().collect()),
        (l, Value::Nil) => l.clone(),
        (_, r) => r.clone(),
    }
}
