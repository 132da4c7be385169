//! Inject handle - what consumers hold to talk to a provider.
//!
//! There is no ambient lookup. A provider hands its handle to its children
//! when it renders them, and composition code passes it further down.
//! Nesting providers gives each subtree the handle of the provider that
//! wraps it, because that is the one it was given.
//!
//! The handle only holds a weak reference. Once its provider unmounts
//! every call returns [`InjectError::Detached`].

use std::rc::{Rc, Weak};

use super::error::{InjectError, Result};
use super::store::StoreInner;
use super::types::{InjectKey, Injectable};
use crate::primitives::{Cleanup, Node};

/// Read/write access to the injection list of one provider.
#[derive(Clone)]
pub struct InjectHandle {
    store: Weak<StoreInner>,
}

impl InjectHandle {
    pub(crate) fn new(store: Weak<StoreInner>) -> Self {
        Self { store }
    }

    /// A handle that was never attached to a provider.
    ///
    /// Every operation on it fails with [`InjectError::Detached`].
    pub fn detached() -> Self {
        Self { store: Weak::new() }
    }

    fn store(&self) -> Result<Rc<StoreInner>> {
        self.store
            .upgrade()
            .filter(|store| store.is_attached())
            .ok_or(InjectError::Detached)
    }

    pub fn is_attached(&self) -> bool {
        self.store().is_ok()
    }

    /// Insert `node` at the provider's mount point, after everything
    /// already injected.
    ///
    /// `id` tags the entry for [`uninject`](Self::uninject); `None` or an
    /// empty string makes it anonymous.
    pub fn inject(&self, node: Node, id: Option<&str>) -> Result<InjectKey> {
        self.store()?.inject(node, id)
    }

    pub fn uninject(&self, id: &str) -> Result<()> {
        self.store()?.uninject(id)
    }

    pub fn purge(&self) -> Result<()> {
        self.store()?.purge();
        Ok(())
    }

    /// Ordered entries. Reading this inside an effect re-runs the effect
    /// on every change.
    pub fn injected(&self) -> Result<Vec<Injectable>> {
        Ok(self.store()?.injected())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.store()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store()?.len() == 0)
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.store()?.contains(id))
    }

    pub fn subscribe(&self, listener: impl Fn(&[Injectable]) + 'static) -> Result<Cleanup> {
        Ok(self.store()?.subscribe(Rc::new(listener)))
    }

    /// Whether both handles talk to the same store.
    pub fn same_store(&self, other: &InjectHandle) -> bool {
        Weak::ptr_eq(&self.store, &other.store)
    }
}

impl std::fmt::Debug for InjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}
