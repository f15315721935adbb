// Environment plumbing: the immutable configuration bundle a facade carries.

use std::sync::{Arc, RwLock};

use crate::cache::CacheCell;
use crate::engine::{ResolutionEngine, ResolverIndex};
use crate::error::{ResolveError, ResolveResult};
use crate::value::{MapRepr, Value};

/// Engine-facing configuration: the resolver index plus the engine itself.
/// Cheap to clone; every facade derived from the same root shares it.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    index: Arc<ResolverIndex>,
    engine: Arc<dyn ResolutionEngine>,
}

impl EnvConfig {
    pub fn builder() -> EnvConfigBuilder {
        EnvConfigBuilder::default()
    }

    pub fn index(&self) -> &ResolverIndex {
        &self.index
    }

    pub fn engine(&self) -> &dyn ResolutionEngine {
        self.engine.as_ref()
    }
}

/// Builder validating that a configuration is complete before it is used.
#[derive(Debug, Default)]
pub struct EnvConfigBuilder {
    index: Option<Arc<ResolverIndex>>,
    engine: Option<Arc<dyn ResolutionEngine>>,
}

impl EnvConfigBuilder {
    pub fn index(mut self, index: ResolverIndex) -> Self {
        self.index = Some(Arc::new(index));
        self
    }

    pub fn engine(mut self, engine: Arc<dyn ResolutionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> ResolveResult<EnvConfig> {
        let index = self
            .index
            .ok_or_else(|| ResolveError::InvalidConfig("missing resolver index".to_string()))?;
        let engine = self
            .engine
            .ok_or_else(|| ResolveError::InvalidConfig("missing resolution engine".to_string()))?;
        Ok(EnvConfig { index, engine })
    }
}

/// One facade's environment: shared configuration, the live cache cell, the
/// original source context it was seeded from, and metadata stored alongside
/// the cell. Immutable as a bundle; the cell inside is the only mutable part.
#[derive(Debug)]
pub struct SmartMapEnv {
    config: EnvConfig,
    cell: CacheCell,
    source: MapRepr,
    meta: RwLock<Option<Value>>,
}

impl SmartMapEnv {
    /// A fresh environment with a private cell seeded from `context`.
    pub fn fresh(config: EnvConfig, context: MapRepr) -> Self {
        SmartMapEnv {
            cell: CacheCell::seeded(&context),
            config,
            source: context,
            meta: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn cell(&self) -> &CacheCell {
        &self.cell
    }

    /// The original context this environment was seeded from. Cache fills do
    /// not touch it; `assoc`/`dissoc` derive their new context from it.
    pub fn source(&self) -> &MapRepr {
        &self.source
    }

    pub fn meta(&self) -> Option<Value> {
        self.meta.read().unwrap().clone()
    }

    pub fn set_meta(&self, meta: Option<Value>) {
        *self.meta.write().unwrap() = meta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RunGraph, Shape};

    #[derive(Debug)]
    struct NoopEngine;

    impl ResolutionEngine for NoopEngine {
        fn compute_run_graph(
            &self,
            _env: &SmartMapEnv,
            _available: &Shape,
            _request: &Shape,
        ) -> ResolveResult<RunGraph> {
            Ok(RunGraph::new(()))
        }

        fn run_graph(&self, _env: &SmartMapEnv, _graph: RunGraph) -> ResolveResult<()> {
            Ok(())
        }
    }

    #[test]
    fn builder_rejects_incomplete_configuration() {
        assert!(matches!(
            EnvConfig::builder().build(),
            Err(ResolveError::InvalidConfig(_))
        ));
        assert!(matches!(
            EnvConfig::builder().index(ResolverIndex::new()).build(),
            Err(ResolveError::InvalidConfig(_))
        ));
        assert!(EnvConfig::builder()
            .index(ResolverIndex::new())
            .engine(Arc::new(NoopEngine))
            .build()
            .is_ok());
    }

    #[test]
    fn fresh_env_owns_a_private_cell() {
        let config = EnvConfig::builder()
            .index(ResolverIndex::new())
            .engine(Arc::new(NoopEngine))
            .build()
            .unwrap();
        let a = SmartMapEnv::fresh(config.clone(), MapRepr::new());
        let b = SmartMapEnv::fresh(config, MapRepr::new());
        assert!(!a.cell().ptr_eq(b.cell()));
    }
}
