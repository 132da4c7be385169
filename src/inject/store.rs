//! Inject Store - the observable list behind a provider.
//!
//! The list is copy-on-write: every mutation builds a new `Vec` and
//! replaces the old one, never editing a snapshot someone else may hold.
//! Two ways to observe it:
//! - reactively, by reading [`InjectStore::injected`] inside an effect
//!   (the store's signal is set on every mutation)
//! - explicitly, with [`InjectStore::subscribe`]
//!
//! # Example
//!
//! ```ignore
//! let store = InjectStore::new();
//!
//! let _unsubscribe = store.subscribe(|entries| {
//!     println!("{} injected", entries.len());
//! });
//!
//! store.inject(node(render_toast), Some("toast"))?;
//! store.uninject("toast")?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{signal, Signal};

use super::error::{InjectError, Result};
use super::handle::InjectHandle;
use super::types::{normalize_id, InjectKey, Injectable};
use crate::primitives::{Cleanup, Node};

/// Called with the new ordered list after every successful mutation.
pub type InjectListener = Rc<dyn Fn(&[Injectable])>;

pub(crate) struct StoreInner {
    /// Untracked copy of the list; mutators read this so that calling
    /// them from inside an effect does not subscribe that effect.
    current: RefCell<Vec<Injectable>>,
    /// Reactive mirror of `current`.
    entries: Signal<Vec<Injectable>>,
    next_key: Cell<u64>,
    listeners: RefCell<Vec<(usize, InjectListener)>>,
    next_listener: Cell<usize>,
    /// Set while listeners run; a nested mutation only marks `dirty`.
    notifying: Cell<bool>,
    dirty: Cell<bool>,
    attached: Cell<bool>,
}

impl StoreInner {
    fn new() -> Self {
        Self {
            current: RefCell::new(Vec::new()),
            entries: signal(Vec::new()),
            next_key: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            notifying: Cell::new(false),
            dirty: Cell::new(false),
            attached: Cell::new(true),
        }
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.attached.get()
    }

    pub(crate) fn inject(&self, node: Node, id: Option<&str>) -> Result<InjectKey> {
        let id = normalize_id(id);

        let (key, next) = {
            let current = self.current.borrow();
            if let Some(id) = &id {
                if current.iter().any(|entry| entry.id() == Some(id.as_str())) {
                    return Err(InjectError::DuplicateId(id.clone()));
                }
            }

            let key = InjectKey(self.next_key.get());
            self.next_key.set(key.0 + 1);

            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Injectable::new(key, id, node));
            (key, next)
        };

        tracing::debug!(%key, id = ?next.last().and_then(Injectable::id), len = next.len(), "injected");
        self.replace(next);
        Ok(key)
    }

    pub(crate) fn uninject(&self, id: &str) -> Result<()> {
        let next: Vec<Injectable> = {
            let current = self.current.borrow();
            if !current.iter().any(|entry| entry.id() == Some(id)) {
                return Err(InjectError::NotFound(id.to_string()));
            }
            current.iter().filter(|entry| entry.id() != Some(id)).cloned().collect()
        };

        tracing::debug!(id, len = next.len(), "uninjected");
        self.replace(next);
        Ok(())
    }

    pub(crate) fn purge(&self) {
        let purged = self.current.borrow().len();
        tracing::debug!(purged, "purged");
        self.replace(Vec::new());
    }

    /// Reactive read: tracks when called inside an effect.
    pub(crate) fn injected(&self) -> Vec<Injectable> {
        self.entries.get()
    }

    pub(crate) fn snapshot(&self) -> Vec<Injectable> {
        self.current.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.current.borrow().len()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.current.borrow().iter().any(|entry| entry.id() == Some(id))
    }

    pub(crate) fn subscribe(self: &Rc<Self>, listener: InjectListener) -> Cleanup {
        let listener_id = self.next_listener.get();
        self.next_listener.set(listener_id + 1);
        self.listeners.borrow_mut().push((listener_id, listener));

        let store = Rc::downgrade(self);
        Box::new(move || {
            if let Some(store) = store.upgrade() {
                store.listeners.borrow_mut().retain(|(id, _)| *id != listener_id);
            }
        })
    }

    /// Swap in a new list, then tell everyone. No borrow is held while
    /// effects or listeners run, so they may call back into the store.
    fn replace(&self, next: Vec<Injectable>) {
        *self.current.borrow_mut() = next.clone();
        self.entries.set(next);
        self.notify();
    }

    /// Run every listener with the current list.
    ///
    /// A mutation made by a listener does not notify recursively. It ends
    /// the current round, and a new round starts with the newer list, so
    /// no listener is ever handed a list that is already stale.
    fn notify(&self) {
        if self.notifying.get() {
            self.dirty.set(true);
            return;
        }

        self.notifying.set(true);
        loop {
            self.dirty.set(false);
            let listeners: Vec<InjectListener> = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            if listeners.is_empty() {
                break;
            }

            let snapshot = self.snapshot();
            tracing::trace!(listeners = listeners.len(), len = snapshot.len(), "notifying inject listeners");
            for listener in listeners {
                listener(&snapshot);
                if self.dirty.get() {
                    break;
                }
            }

            if !self.dirty.get() {
                break;
            }
        }
        self.notifying.set(false);
    }

    fn detach(&self) {
        if !self.attached.get() {
            return;
        }
        // Before the final notification, so its listeners cannot refill the list.
        self.attached.set(false);
        if !self.current.borrow().is_empty() {
            self.replace(Vec::new());
        }
        self.listeners.borrow_mut().clear();
    }
}

/// Owner of an injection list.
///
/// Cloning shares the same list. Consumers should get an [`InjectHandle`]
/// instead, which stops working once the store is detached.
#[derive(Clone)]
pub struct InjectStore {
    inner: Rc<StoreInner>,
}

impl InjectStore {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner::new()),
        }
    }

    fn attached(&self) -> Result<&StoreInner> {
        if self.inner.is_attached() {
            Ok(&self.inner)
        } else {
            Err(InjectError::Detached)
        }
    }

    /// Append `node` to the list.
    ///
    /// An empty `id` is treated as no id. Fails with
    /// [`InjectError::DuplicateId`] if another entry already uses `id`.
    pub fn inject(&self, node: Node, id: Option<&str>) -> Result<InjectKey> {
        self.attached()?.inject(node, id)
    }

    /// Remove the entry tagged `id`, keeping the others in order.
    pub fn uninject(&self, id: &str) -> Result<()> {
        self.attached()?.uninject(id)
    }

    /// Remove every entry, anonymous ones included.
    pub fn purge(&self) -> Result<()> {
        self.attached()?.purge();
        Ok(())
    }

    /// Current entries in insertion order. Tracks inside effects.
    pub fn injected(&self) -> Result<Vec<Injectable>> {
        Ok(self.attached()?.injected())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.attached()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.attached()?.len() == 0)
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.attached()?.contains(id))
    }

    /// Register a listener for list changes. Call the returned cleanup to
    /// unsubscribe.
    pub fn subscribe(&self, listener: impl Fn(&[Injectable]) + 'static) -> Result<Cleanup> {
        self.attached()?;
        Ok(self.inner.subscribe(Rc::new(listener)))
    }

    /// A handle for consumers.
    pub fn handle(&self) -> InjectHandle {
        InjectHandle::new(Rc::downgrade(&self.inner))
    }

    pub fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }

    /// Tear the store down: drop every entry, notify one last time, then
    /// refuse all further operations from the store and its handles.
    pub fn detach(&self) {
        tracing::debug!(len = self.inner.len(), "detaching inject store");
        self.inner.detach();
    }
}

impl Default for InjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::node;
    use spark_signals::effect;

    fn blank() -> Node {
        node(|| Box::new(|| {}))
    }

    fn ids(store: &InjectStore) -> Vec<Option<String>> {
        store
            .injected()
            .expect("attached")
            .iter()
            .map(|entry| entry.id().map(str::to_owned))
            .collect()
    }

    #[test]
    fn test_inject_appends_in_order() {
        let store = InjectStore::new();

        store.inject(blank(), Some("a")).unwrap();
        store.inject(blank(), None).unwrap();
        store.inject(blank(), Some("b")).unwrap();

        assert_eq!(ids(&store), vec![Some("a".into()), None, Some("b".into())]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = InjectStore::new();

        store.inject(blank(), Some("a")).unwrap();
        let err = store.inject(blank(), Some("a")).unwrap_err();

        assert_eq!(err, InjectError::DuplicateId("a".into()));
        assert_eq!(store.len().unwrap(), 1, "failed inject must not change the list");
    }

    #[test]
    fn test_uninject_missing_id() {
        let store = InjectStore::new();

        assert_eq!(store.uninject("x"), Err(InjectError::NotFound("x".into())));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_uninject_keeps_relative_order() {
        let store = InjectStore::new();
        let a = blank();
        let b = blank();
        let c = blank();

        store.inject(a, Some("x")).unwrap();
        store.inject(b.clone(), None).unwrap();
        store.inject(c.clone(), Some("y")).unwrap();
        store.uninject("x").unwrap();

        let entries = store.injected().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(Rc::ptr_eq(entries[0].node(), &b));
        assert!(Rc::ptr_eq(entries[1].node(), &c));
    }

    #[test]
    fn test_id_can_be_reused_after_uninject() {
        let store = InjectStore::new();

        store.inject(blank(), Some("a")).unwrap();
        store.uninject("a").unwrap();
        store.inject(blank(), Some("a")).unwrap();

        assert!(store.contains("a").unwrap());
    }

    #[test]
    fn test_anonymous_entries_never_collide() {
        let store = InjectStore::new();
        let shared = blank();

        for _ in 0..3 {
            store.inject(shared.clone(), None).unwrap();
        }
        store.inject(blank(), Some("")).unwrap();

        let entries = store.injected().unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(Injectable::is_anonymous));
        assert_eq!(store.uninject(""), Err(InjectError::NotFound(String::new())));

        store.purge().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_keys_are_unique_and_increasing() {
        let store = InjectStore::new();

        let first = store.inject(blank(), Some("a")).unwrap();
        store.uninject("a").unwrap();
        let second = store.inject(blank(), Some("a")).unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_purge_is_idempotent() {
        let store = InjectStore::new();

        store.purge().unwrap();
        assert!(store.is_empty().unwrap());

        store.inject(blank(), Some("a")).unwrap();
        store.inject(blank(), None).unwrap();
        store.purge().unwrap();
        store.purge().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_snapshots_are_not_mutated() {
        let store = InjectStore::new();

        store.inject(blank(), Some("a")).unwrap();
        let before = store.injected().unwrap();
        store.inject(blank(), Some("b")).unwrap();
        store.purge().unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].id(), Some("a"));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let store = InjectStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let unsubscribe = store
            .subscribe(move |entries| seen_clone.borrow_mut().push(entries.len()))
            .unwrap();

        store.inject(blank(), Some("a")).unwrap();
        store.inject(blank(), None).unwrap();
        let _ = store.inject(blank(), Some("a"));
        store.uninject("a").unwrap();
        store.purge().unwrap();
        assert_eq!(*seen.borrow(), vec![1, 2, 1, 0], "failed mutations do not notify");

        unsubscribe();
        store.inject(blank(), None).unwrap();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn test_listener_may_mutate_store() {
        let store = InjectStore::new();
        let store_clone = store.clone();

        // Keeps at most one anonymous entry.
        let _unsubscribe = store
            .subscribe(move |entries| {
                if entries.len() > 1 {
                    store_clone.purge().unwrap();
                }
            })
            .unwrap();

        store.inject(blank(), None).unwrap();
        store.inject(blank(), None).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_later_listeners_never_see_stale_list() {
        let store = InjectStore::new();
        let store_clone = store.clone();
        let _trim = store
            .subscribe(move |entries| {
                if entries.len() > 1 {
                    store_clone.purge().unwrap();
                }
            })
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let _record = store
            .subscribe(move |entries| seen_clone.borrow_mut().push(entries.len()))
            .unwrap();

        store.inject(blank(), None).unwrap();
        store.inject(blank(), None).unwrap();

        assert_eq!(*seen.borrow(), vec![1, 0], "the purged list replaces the two-entry one");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_effect_tracks_injected() {
        let store = InjectStore::new();
        let store_clone = store.clone();
        let observed = Rc::new(Cell::new(usize::MAX));
        let observed_clone = observed.clone();

        let _effect = effect(move || {
            observed_clone.set(store_clone.injected().map(|e| e.len()).unwrap_or(0));
        });
        assert_eq!(observed.get(), 0);

        store.inject(blank(), Some("a")).unwrap();
        assert_eq!(observed.get(), 1);

        store.purge().unwrap();
        assert_eq!(observed.get(), 0);
    }

    #[test]
    fn test_detach_clears_and_rejects() {
        let store = InjectStore::new();
        let notified = Rc::new(Cell::new(0));
        let notified_clone = notified.clone();
        let _unsubscribe = store
            .subscribe(move |_| notified_clone.set(notified_clone.get() + 1))
            .unwrap();

        store.inject(blank(), Some("a")).unwrap();
        store.detach();

        assert_eq!(notified.get(), 2, "detach notifies the final empty list");
        assert!(!store.is_attached());
        assert_eq!(store.inject(blank(), None), Err(InjectError::Detached));
        assert_eq!(store.purge(), Err(InjectError::Detached));
        assert_eq!(store.len(), Err(InjectError::Detached));
    }

    #[test]
    fn test_detach_refuses_inject_from_final_notification() {
        let store = InjectStore::new();
        let store_clone = store.clone();
        let refused = Rc::new(RefCell::new(None));
        let refused_clone = refused.clone();

        let _refill = store
            .subscribe(move |entries| {
                if entries.is_empty() {
                    *refused_clone.borrow_mut() = Some(store_clone.inject(blank(), Some("again")));
                }
            })
            .unwrap();

        store.inject(blank(), Some("a")).unwrap();
        store.detach();

        assert_eq!(*refused.borrow(), Some(Err(InjectError::Detached)));
        assert!(!store.is_attached());
        assert!(store.inner.snapshot().is_empty(), "nothing survives detach");
    }
}
