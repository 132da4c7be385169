//! Inject - runtime content injection.
//!
//! A provider is a mount point whose content can be extended at runtime:
//! anyone holding its [`InjectHandle`] can `inject` a [`Node`], optionally
//! tagged with an id, `uninject` it by that id, or `purge` everything.
//! Injected nodes render under the provider, before its own children.
//!
//! - [`InjectStore`] - the observable copy-on-write list
//! - [`InjectHandle`] - the consumer-side accessor
//! - [`inject_provider`] - the component that owns a store and renders it
//!
//! [`Node`]: crate::primitives::Node

mod error;
mod handle;
mod provider;
mod store;
mod types;

pub use error::{InjectError, Result};
pub use handle::InjectHandle;
pub use provider::{inject_provider, InjectProvider, InjectProviderProps, RenderSlot};
pub use store::{InjectListener, InjectStore};
pub use types::{InjectKey, Injectable};
