// Resolution engine contract.
//
// The engine is an external collaborator: the facade hands it an environment,
// the shape of what is already cached and the shape of what it wants, gets
// back an opaque plan, and hands the plan straight back for execution.
// Executing a plan fills the environment's cache cell as a side effect.

use std::any::Any;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::attr::{Attr, ResolverId};
use crate::env::SmartMapEnv;
use crate::error::ResolveResult;
use crate::value::MapRepr;

/// A flat description of which attributes are available or requested.
pub type Shape = IndexSet<Attr>;

/// The shape of an attribute tree: its top-level keys.
pub fn shape_of(tree: &MapRepr) -> Shape {
    tree.keys().cloned().collect()
}

/// Output-to-resolvers index: for each attribute, which resolvers can
/// produce it. This is the capability surface `find` consults; the engine
/// uses it to select and order resolvers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverIndex {
    oir: IndexMap<Attr, IndexSet<ResolverId>>,
}

impl ResolverIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver as a producer of the given output attributes.
    pub fn add(&mut self, resolver: ResolverId, outputs: impl IntoIterator<Item = Attr>) {
        for attr in outputs {
            self.oir.entry(attr).or_default().insert(resolver.clone());
        }
    }

    /// True if at least one resolver can produce this attribute.
    pub fn resolvable(&self, attr: &Attr) -> bool {
        self.oir.contains_key(attr)
    }

    pub fn resolvers_for(&self, attr: &Attr) -> Option<&IndexSet<ResolverId>> {
        self.oir.get(attr)
    }

    pub fn attrs(&self) -> impl Iterator<Item = &Attr> {
        self.oir.keys()
    }

    pub fn len(&self) -> usize {
        self.oir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oir.is_empty()
    }
}

/// Opaque execution plan. The core never looks inside; engines downcast it
/// back to whatever they built in `compute_run_graph`.
pub struct RunGraph(Box<dyn Any + Send + Sync>);

impl RunGraph {
    pub fn new<T: Any + Send + Sync>(plan: T) -> Self {
        RunGraph(Box::new(plan))
    }

    pub fn downcast<T: Any + Send + Sync>(self) -> Option<Box<T>> {
        self.0.downcast().ok()
    }

    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for RunGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<run-graph>")
    }
}

/// The two-operation engine interface.
pub trait ResolutionEngine: fmt::Debug + Send + Sync {
    /// Plan resolution of `request` given what is `available`. Deterministic
    /// for a fixed resolver index, shape and request; never mutates. An
    /// unreachable request yields an empty plan, not an error.
    fn compute_run_graph(
        &self,
        env: &SmartMapEnv,
        available: &Shape,
        request: &Shape,
    ) -> ResolveResult<RunGraph>;

    /// Execute a plan. May fill the environment's cache cell with the
    /// requested attribute and any sibling attributes the computation
    /// produced along the way. Fails if a resolver fails internally.
    fn run_graph(&self, env: &SmartMapEnv, graph: RunGraph) -> ResolveResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_tracks_producers_per_attribute() {
        let mut index = ResolverIndex::new();
        index.add(
            ResolverId::new("user-by-id"),
            vec![Attr::new("user/name"), Attr::new("user/email")],
        );
        index.add(ResolverId::new("user-alias"), vec![Attr::new("user/name")]);

        assert!(index.resolvable(&Attr::new("user/name")));
        assert!(!index.resolvable(&Attr::new("user/age")));
        assert_eq!(index.resolvers_for(&Attr::new("user/name")).unwrap().len(), 2);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn run_graph_round_trips_engine_payloads() {
        let graph = RunGraph::new(vec![ResolverId::new("a")]);
        assert!(graph.downcast_ref::<Vec<ResolverId>>().is_some());
        let plan = graph.downcast::<Vec<ResolverId>>().unwrap();
        assert_eq!(*plan, vec![ResolverId::new("a")]);
    }
}
