//! # spark-inject
//!
//! Runtime content injection for reactive spark-tui component trees.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Components are render functions: they mount under the current parent
//! context and return a [`Cleanup`]. An inject provider is a component
//! with a mount point whose content can be extended after it has mounted:
//!
//! ```text
//! handle.inject(node, id) → InjectStore signal → each() effect → node() under mount point
//! ```
//!
//! Consumers never look the provider up. They are handed its
//! [`InjectHandle`], either as the argument of the provider's children or
//! by whoever created the provider.
//!
//! ## Modules
//!
//! - [`engine`] - Mount registry: indices, parent context, destroy callbacks
//! - [`primitives`] - Cleanup/Node types and keyed list rendering
//! - [`inject`] - Store, handle and provider

pub mod engine;
pub mod inject;
pub mod primitives;

pub use engine::{
    allocate_index, get_allocated_count, get_current_parent_index, get_id, get_index,
    is_allocated, on_destroy, pop_parent_context, push_parent_context, release_index,
    reset_registry, with_parent_context,
};

pub use primitives::{children, each, node, noop_cleanup, Children, Cleanup, Node};

pub use inject::{
    inject_provider, InjectError, InjectHandle, InjectKey, InjectListener, InjectProvider,
    InjectProviderProps, InjectStore, Injectable, RenderSlot,
};
