//! Injectable entries.

use std::fmt;
use std::rc::Rc;

use crate::primitives::Node;

/// Identity of one injected entry, assigned by its store.
///
/// Keys only ever grow, so an entry keeps its key (and its rendered
/// component) while entries around it come and go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InjectKey(pub(crate) u64);

impl InjectKey {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inject-{}", self.0)
    }
}

/// A piece of UI held by an inject store.
#[derive(Clone)]
pub struct Injectable {
    key: InjectKey,
    id: Option<String>,
    node: Node,
}

impl Injectable {
    pub(crate) fn new(key: InjectKey, id: Option<String>, node: Node) -> Self {
        Self { key, id, node }
    }

    pub fn key(&self) -> InjectKey {
        self.key
    }

    /// The caller-supplied id, `None` for anonymous entries.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }
}

// Same entry: same key, same id, same node (by pointer).
impl PartialEq for Injectable {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.id == other.id && Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Injectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injectable")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Normalize a caller-supplied id: the empty string means anonymous.
pub(crate) fn normalize_id(id: Option<&str>) -> Option<String> {
    id.filter(|id| !id.is_empty()).map(str::to_owned)
}
