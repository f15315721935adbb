//! Lazily resolved, cache-backed attribute maps.
//!
//! A [`SmartMap`] reads like a plain associative collection over named
//! attributes. Attributes present in the seeded context are served from the
//! cache; a read that misses asks an external [`ResolutionEngine`] to plan
//! and execute whatever computations can produce the attribute, memoizing
//! the result (and any siblings the computation happened to produce) for all
//! later reads. Nested maps wrap recursively into smart maps of their own,
//! scoped to the sub-entity.

pub mod attr;
pub mod cache;
pub mod coll;
pub mod engine;
pub mod env;
pub mod error;
pub mod json;
pub mod smart_map;
pub mod value;
pub mod wrap;

pub use attr::{Attr, ResolverId};
pub use cache::CacheCell;
pub use engine::{shape_of, ResolutionEngine, ResolverIndex, RunGraph, Shape};
pub use env::{EnvConfig, EnvConfigBuilder, SmartMapEnv};
pub use error::{ResolveError, ResolveResult};
pub use smart_map::{environment_of, Entries, SmartMap};
pub use value::{MapRepr, Value};
pub use wrap::{wrap, WrapSeq, Wrapped};
