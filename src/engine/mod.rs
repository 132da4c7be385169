//! Engine - Mount registry.
//!
//! Components are not objects. They are indices handed out by the
//! registry, linked to their parent through the parent context that was
//! active when they were allocated:
//!
//! ```text
//! Index 0: provider mount point (parent=None)
//! Index 1: injected toast       (parent=0)
//! Index 2: provider child       (parent=0)
//! ```
//!
//! Releasing an index releases its whole subtree.

mod registry;

pub use registry::*;
