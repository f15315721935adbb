// The cache cell: shared mutable storage for the live attribute tree.
//
// Every facade referencing the same environment sees the same cell. All
// mutation funnels through `swap`, which applies a pure function to the
// current tree under the write lock, so two concurrent cache fills serialize
// instead of silently dropping one another's result.

use std::sync::{Arc, RwLock};

use crate::attr::Attr;
use crate::coll::merge_grow;
use crate::value::{MapRepr, Value};

#[derive(Debug, Clone, Default)]
pub struct CacheCell {
    inner: Arc<RwLock<MapRepr>>,
}

impl CacheCell {
    /// A cell seeded with a copy of the given context.
    pub fn seeded(context: &MapRepr) -> Self {
        CacheCell {
            inner: Arc::new(RwLock::new(context.clone())),
        }
    }

    /// Snapshot of the current tree.
    pub fn snapshot(&self) -> MapRepr {
        self.inner.read().unwrap().clone()
    }

    pub fn get(&self, key: &Attr) -> Option<Value> {
        self.inner.read().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &Attr) -> bool {
        self.inner.read().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Keys in tree order, snapshotted at call time.
    pub fn keys(&self) -> Vec<Attr> {
        self.inner.read().unwrap().keys().cloned().collect()
    }

    /// Atomically replace the tree with `f(current)`. `f` must be pure; it
    /// runs under the write lock.
    pub fn swap(&self, f: impl FnOnce(&MapRepr) -> MapRepr) {
        let mut guard = self.inner.write().unwrap();
        let next = f(&*guard);
        *guard = next;
    }

    /// Cache fill: grow-merge newly resolved attributes into the tree.
    /// Existing keys are never removed; set values union.
    pub fn fill(&self, delta: &MapRepr) {
        log::trace!("cache fill: {} attribute(s)", delta.len());
        self.swap(|current| merge_grow(current, delta));
    }

    /// Direct in-place write, bypassing the merge discipline.
    pub fn insert(&self, key: Attr, value: Value) {
        self.inner.write().unwrap().insert(key, value);
    }

    /// Direct in-place removal, preserving the order of remaining keys.
    pub fn remove(&self, key: &Attr) -> Option<Value> {
        self.inner.write().unwrap().shift_remove(key)
    }

    /// True if both handles point at the same underlying cell.
    pub fn ptr_eq(&self, other: &CacheCell) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(s: &str) -> Attr {
        Attr::new(s)
    }

    #[test]
    fn seeded_cell_copies_the_context() {
        let mut ctx = MapRepr::new();
        ctx.insert(attr("a"), Value::Integer(1));
        let cell = CacheCell::seeded(&ctx);
        ctx.insert(attr("b"), Value::Integer(2));
        assert_eq!(cell.len(), 1);
        assert_eq!(cell.get(&attr("a")), Some(Value::Integer(1)));
    }

    #[test]
    fn fill_grows_without_removing() {
        let mut ctx = MapRepr::new();
        ctx.insert(attr("a"), Value::Integer(1));
        let cell = CacheCell::seeded(&ctx);

        let mut delta = MapRepr::new();
        delta.insert(attr("b"), Value::Integer(2));
        delta.insert(attr("a"), Value::Nil);
        cell.fill(&delta);

        assert_eq!(cell.get(&attr("a")), Some(Value::Integer(1)));
        assert_eq!(cell.get(&attr("b")), Some(Value::Integer(2)));
    }

    #[test]
    fn clones_share_the_same_cell() {
        let cell = CacheCell::default();
        let alias = cell.clone();
        alias.insert(attr("k"), Value::string("v"));
        assert!(cell.contains(&attr("k")));
        assert!(cell.ptr_eq(&alias));
        assert!(!cell.ptr_eq(&CacheCell::default()));
    }

    #[test]
    fn concurrent_fills_both_land() {
        let cell = CacheCell::default();
        let mut handles = Vec::new();
        for i in 0..8i64 {
            let cell = cell.clone();
            handles.push(std::thread::spawn(move || {
                let mut delta = MapRepr::new();
                delta.insert(attr(&format!("k{}", i)), Value::Integer(i));
                cell.fill(&delta);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cell.len(), 8);
    }
}
