// Attribute and resolver identifiers.
// Attributes are namespaced keyword-style names (e.g. `user/id`) used as map keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named attribute. Opaque, hashable, ordered; rendered as `:ns/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attr(pub String);

impl Attr {
    pub fn new(s: &str) -> Self {
        Attr(s.to_string())
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<&str> for Attr {
    fn from(s: &str) -> Self {
        Attr::new(s)
    }
}

/// Identifier of a resolver in the resolver index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolverId(pub String);

impl ResolverId {
    pub fn new(s: &str) -> Self {
        ResolverId(s.to_string())
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResolverId {
    fn from(s: &str) -> Self {
        ResolverId::new(s)
    }
}
