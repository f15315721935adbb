// The smart map facade: a map-compatible view over an attribute tree where
// missing attributes are resolved on demand through the engine and memoized.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::attr::Attr;
use crate::engine::{shape_of, Shape};
use crate::env::{EnvConfig, SmartMapEnv};
use crate::error::{ResolveError, ResolveResult};
use crate::value::{map_digest, MapRepr, Value};
use crate::wrap::{wrap, Wrapped};

/// A lazily populated attribute map. Reads hit the cache first; a miss asks
/// the resolution engine to plan and execute resolution for the requested
/// attribute, which fills the cache as a side effect. Clones share the same
/// environment, and therefore the same live cache.
#[derive(Debug, Clone)]
pub struct SmartMap {
    env: Arc<SmartMapEnv>,
}

impl SmartMap {
    /// Build a smart map from a configuration and a map-shaped context.
    /// The cache is seeded with a copy of the context.
    pub fn create(config: EnvConfig, context: Value) -> ResolveResult<SmartMap> {
        match context {
            Value::Map(m) => Ok(SmartMap::with_context(config, m)),
            other => Err(ResolveError::TypeMismatch {
                expected: "map".to_string(),
                actual: other.type_name().to_string(),
                operation: "smart-map".to_string(),
            }),
        }
    }

    /// Typed variant of [`SmartMap::create`].
    pub fn with_context(config: EnvConfig, context: MapRepr) -> SmartMap {
        SmartMap {
            env: Arc::new(SmartMapEnv::fresh(config, context)),
        }
    }

    pub fn config(&self) -> &EnvConfig {
        self.env.config()
    }

    pub fn env(&self) -> &SmartMapEnv {
        &self.env
    }

    /// Read an attribute. A cache hit (including an explicitly stored nil)
    /// returns the wrapped value directly. A miss triggers resolution; if the
    /// attribute is still absent afterwards, that is `Ok(None)` - there was
    /// simply no path to compute it. Resolver failures are errors.
    pub fn get(&self, key: &Attr) -> ResolveResult<Option<Wrapped>> {
        if let Some(v) = self.env.cell().get(key) {
            return Ok(Some(wrap(self.config(), v)));
        }
        self.resolve(key)?;
        Ok(self.env.cell().get(key).map(|v| wrap(self.config(), v)))
    }

    /// `get` with a fallback for the unresolvable case.
    pub fn get_or(&self, key: &Attr, default: Value) -> ResolveResult<Wrapped> {
        match self.get(key)? {
            Some(w) => Ok(w),
            None => Ok(wrap(self.config(), default)),
        }
    }

    /// Invocation form: reading a missing, unresolvable attribute yields nil.
    pub fn call(&self, key: &Attr) -> ResolveResult<Wrapped> {
        self.get_or(key, Value::Nil)
    }

    /// True iff the attribute is currently cached. Never triggers resolution.
    pub fn contains_key(&self, key: &Attr) -> bool {
        self.env.cell().contains(key)
    }

    /// An entry for the attribute if it is cached or the resolver index
    /// reports it producible; resolves like `get`. Unlike `get`, this
    /// reasons about resolvability before forcing anything.
    pub fn find(&self, key: &Attr) -> ResolveResult<Option<(Attr, Wrapped)>> {
        if !self.contains_key(key) && !self.config().index().resolvable(key) {
            return Ok(None);
        }
        Ok(self.get(key)?.map(|w| (key.clone(), w)))
    }

    /// Cached keys, snapshotted at call time, in cache order. Does not force
    /// any resolution.
    pub fn keys(&self) -> Vec<Attr> {
        self.env.cell().keys()
    }

    pub fn len(&self) -> usize {
        self.env.cell().len()
    }

    pub fn is_empty(&self) -> bool {
        self.env.cell().is_empty()
    }

    /// A new smart map whose context is the ORIGINAL source context plus this
    /// entry, over a brand-new private cache. Every previously resolved
    /// derived value is dropped: it may have depended on the changed key.
    pub fn assoc(&self, key: Attr, value: Value) -> SmartMap {
        let mut context = self.env.source().clone();
        context.insert(key, value);
        self.rebuild(context)
    }

    /// Counterpart of [`SmartMap::assoc`] for removal; same invalidation
    /// semantics.
    pub fn dissoc(&self, key: &Attr) -> SmartMap {
        let mut context = self.env.source().clone();
        context.shift_remove(key);
        self.rebuild(context)
    }

    fn rebuild(&self, context: MapRepr) -> SmartMap {
        let next = SmartMap::with_context(self.config().clone(), context);
        next.env.set_meta(self.env.meta());
        next
    }

    /// Write straight into the live cache, bypassing the engine and keeping
    /// this facade's identity. Visible to every clone sharing this
    /// environment. Escape hatch: a value injected here may not match what
    /// resolution would have produced, and nothing else is invalidated.
    pub fn assoc_in_place(&self, key: Attr, value: Value) -> &Self {
        self.env.cell().insert(key, value);
        self
    }

    /// In-place removal; same sharing and consistency caveats as
    /// [`SmartMap::assoc_in_place`].
    pub fn dissoc_in_place(&self, key: &Attr) -> &Self {
        self.env.cell().remove(key);
        self
    }

    /// Iterate entries as `(attribute, wrapped value)` pairs over a snapshot
    /// of the cache, wrapping each value on demand.
    pub fn entries(&self) -> Entries {
        Entries {
            config: self.config().clone(),
            items: self.env.cell().snapshot().into_iter().collect(),
            index: 0,
        }
    }

    /// Snapshot of the cache as a plain map.
    pub fn to_map(&self) -> MapRepr {
        self.env.cell().snapshot()
    }

    /// An empty smart map with the same configuration and metadata.
    pub fn empty(&self) -> SmartMap {
        self.rebuild(MapRepr::new())
    }

    pub fn meta(&self) -> Option<Value> {
        self.env.meta()
    }

    pub fn set_meta(&self, meta: Option<Value>) -> &Self {
        self.env.set_meta(meta);
        self
    }

    fn resolve(&self, key: &Attr) -> ResolveResult<()> {
        let available: Shape = shape_of(&self.env.cell().snapshot());
        let request: Shape = std::iter::once(key.clone()).collect();
        log::debug!("cache miss for {}, requesting resolution", key);

        let engine = self.config().engine();
        let graph = engine
            .compute_run_graph(&self.env, &available, &request)
            .map_err(|e| ResolveError::resolution_of(key.clone(), e))?;
        engine
            .run_graph(&self.env, graph)
            .map_err(|e| ResolveError::resolution_of(key.clone(), e))?;
        Ok(())
    }
}

/// Snapshot iterator over a smart map's entries.
pub struct Entries {
    config: EnvConfig,
    items: Vec<(Attr, Value)>,
    index: usize,
}

impl Iterator for Entries {
    type Item = (Attr, Wrapped);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.items.get(self.index)?.clone();
        self.index += 1;
        Some((key, wrap(&self.config, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Entries {}

impl<'a> IntoIterator for &'a SmartMap {
    type Item = (Attr, Wrapped);
    type IntoIter = Entries;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Equality is by cache content, exactly like comparing two plain maps.
/// Environment identity plays no part.
impl PartialEq for SmartMap {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl Eq for SmartMap {}

impl PartialEq<MapRepr> for SmartMap {
    fn eq(&self, other: &MapRepr) -> bool {
        self.to_map() == *other
    }
}

impl Hash for SmartMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        map_digest(&self.to_map()).hash(state);
    }
}

impl fmt::Display for SmartMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Map(self.to_map()))
    }
}

/// Extract the engine-facing configuration of a wrapped map. Anything that
/// is not a smart map is a type mismatch.
pub fn environment_of(wrapped: &Wrapped) -> ResolveResult<EnvConfig> {
    match wrapped {
        Wrapped::Map(sm) => Ok(sm.config().clone()),
        other => Err(ResolveError::TypeMismatch {
            expected: "smart map".to_string(),
            actual: other.type_name().to_string(),
            operation: "environment-of".to_string(),
        }),
    }
}
