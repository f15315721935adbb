#![allow(dead_code)]

// Table-driven stub engine shared by the integration tests. Each resolver
// maps one input attribute's value to a map of output attributes through a
// lookup table; executing a plan fills the environment's cache with every
// attribute the matched row produced.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use smartmap::{
    Attr, EnvConfig, MapRepr, ResolutionEngine, ResolveError, ResolveResult, ResolverId,
    ResolverIndex, RunGraph, Shape, SmartMapEnv, Value,
};

#[derive(Debug)]
pub struct TableResolver {
    pub id: ResolverId,
    pub input: Attr,
    pub outputs: Vec<Attr>,
    pub table: Vec<(Value, MapRepr)>,
    pub fail: bool,
}

impl TableResolver {
    pub fn new(id: &str, input: &str, outputs: &[&str], table: Vec<(Value, MapRepr)>) -> Self {
        TableResolver {
            id: ResolverId::new(id),
            input: Attr::new(input),
            outputs: outputs.iter().map(|o| Attr::new(o)).collect(),
            table,
            fail: false,
        }
    }

    pub fn failing(id: &str, input: &str, outputs: &[&str]) -> Self {
        TableResolver {
            id: ResolverId::new(id),
            input: Attr::new(input),
            outputs: outputs.iter().map(|o| Attr::new(o)).collect(),
            table: Vec::new(),
            fail: true,
        }
    }
}

#[derive(Debug)]
pub struct TableEngine {
    resolvers: Vec<TableResolver>,
    calls: AtomicUsize,
}

impl TableEngine {
    pub fn new(resolvers: Vec<TableResolver>) -> Self {
        TableEngine {
            resolvers,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many resolver invocations have happened so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn index(&self) -> ResolverIndex {
        let mut index = ResolverIndex::new();
        for r in &self.resolvers {
            index.add(r.id.clone(), r.outputs.iter().cloned());
        }
        index
    }
}

impl ResolutionEngine for TableEngine {
    fn compute_run_graph(
        &self,
        _env: &SmartMapEnv,
        available: &Shape,
        request: &Shape,
    ) -> ResolveResult<RunGraph> {
        let plan: Vec<ResolverId> = self
            .resolvers
            .iter()
            .filter(|r| available.contains(&r.input))
            .filter(|r| r.outputs.iter().any(|o| request.contains(o)))
            .map(|r| r.id.clone())
            .collect();
        Ok(RunGraph::new(plan))
    }

    fn run_graph(&self, env: &SmartMapEnv, graph: RunGraph) -> ResolveResult<()> {
        let plan = graph
            .downcast::<Vec<ResolverId>>()
            .ok_or_else(|| ResolveError::Engine("unrecognized plan".to_string()))?;
        for id in plan.iter() {
            let resolver = self
                .resolvers
                .iter()
                .find(|r| &r.id == id)
                .ok_or_else(|| ResolveError::Engine(format!("unknown resolver {}", id)))?;
            self.calls.fetch_add(1, Ordering::SeqCst);
            if resolver.fail {
                return Err(ResolveError::Engine(format!(
                    "resolver {} failed",
                    resolver.id
                )));
            }
            if let Some(input) = env.cell().get(&resolver.input) {
                if let Some((_, output)) = resolver.table.iter().find(|(k, _)| *k == input) {
                    env.cell().fill(output);
                }
            }
        }
        Ok(())
    }
}

pub fn attr(s: &str) -> Attr {
    Attr::new(s)
}

pub fn config_for(engine: Arc<TableEngine>) -> EnvConfig {
    EnvConfig::builder()
        .index(engine.index())
        .engine(engine)
        .build()
        .expect("complete configuration")
}

/// `{:user/id 1}` context plus a `user/id -> user/name, user/email` resolver
/// over the lookup table `{1 => ada}`.
pub fn user_engine() -> Arc<TableEngine> {
    let mut output = MapRepr::new();
    output.insert(attr("user/name"), Value::string("ada"));
    output.insert(attr("user/email"), Value::string("ada@example.com"));
    Arc::new(TableEngine::new(vec![TableResolver::new(
        "user-by-id",
        "user/id",
        &["user/name", "user/email"],
        vec![(Value::Integer(1), output)],
    )]))
}

pub fn user_context() -> MapRepr {
    let mut ctx = MapRepr::new();
    ctx.insert(attr("user/id"), Value::Integer(1));
    ctx
}
