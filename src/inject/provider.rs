//! Inject Provider - a mount point that renders injected content.
//!
//! The provider owns an [`InjectStore`], allocates a mount point in the
//! registry and renders, under that mount point:
//! 1. every injected node, keyed by its [`InjectKey`], in list order
//! 2. its own children, which receive the provider's [`InjectHandle`]
//!
//! Injected nodes are rendered by [`each`], so adding or removing an
//! entry only mounts or unmounts that entry's component.
//!
//! # Example
//!
//! ```ignore
//! let provider = inject_provider(InjectProviderProps {
//!     id: Some("app".into()),
//!     children: Some(children(|inject: &InjectHandle| {
//!         let inject = inject.clone();
//!         on_key("n", move || {
//!             inject.inject(node(render_toast), Some("toast")).is_ok()
//!         })
//!     })),
//! });
//!
//! // Later, from anywhere that was given the handle:
//! provider.handle().uninject("toast")?;
//!
//! // Unmounting drops all injected content.
//! provider.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::handle::InjectHandle;
use super::store::InjectStore;
use super::types::{InjectKey, Injectable};
use crate::engine::{allocate_index, on_destroy, release_index, with_parent_context};
use crate::primitives::{each, Children, Cleanup};

// =============================================================================
// Props
// =============================================================================

/// Props for [`inject_provider`].
#[derive(Default)]
pub struct InjectProviderProps {
    /// Registry ID of the mount point. Generated when `None`.
    pub id: Option<String>,
    /// Rendered once, after the injected content.
    pub children: Option<Children<InjectHandle>>,
}

/// One entry of a provider's render output, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderSlot {
    Injected(InjectKey),
    Children,
}

// =============================================================================
// Provider
// =============================================================================

/// A mounted inject provider.
///
/// Dropping it (or calling [`unmount`](Self::unmount)) unmounts every
/// injected component and the children, releases the mount point and
/// detaches all handles. Releasing the mount point from elsewhere (for
/// example when an enclosing component is released) does the same.
pub struct InjectProvider {
    store: InjectStore,
    mount_index: usize,
    has_children: bool,
    teardown: Rc<RefCell<Option<Cleanup>>>,
}

/// Mount an inject provider under the current parent context.
pub fn inject_provider(props: InjectProviderProps) -> InjectProvider {
    let mount_index = allocate_index(props.id.as_deref());
    let store = InjectStore::new();
    let handle = store.handle();
    tracing::debug!(mount_index, id = ?props.id, "mounting inject provider");

    let entries = store.handle();
    let list_cleanup = with_parent_context(Some(mount_index), || {
        each(
            move || entries.injected().unwrap_or_default(),
            |entry: &Injectable, key: InjectKey| {
                tracing::trace!(%key, id = ?entry.id(), "rendering injectable");
                (entry.node())()
            },
            Injectable::key,
        )
    });

    let has_children = props.children.is_some();
    let children_cleanup = props
        .children
        .map(|children| with_parent_context(Some(mount_index), || children(&handle)));

    let store_for_teardown = store.clone();
    let teardown: Cleanup = Box::new(move || {
        tracing::debug!(mount_index, "unmounting inject provider");
        list_cleanup();
        if let Some(cleanup) = children_cleanup {
            cleanup();
        }
        store_for_teardown.detach();
    });
    let teardown = Rc::new(RefCell::new(Some(teardown)));

    let teardown_on_release = teardown.clone();
    on_destroy(mount_index, move || run_teardown(&teardown_on_release));

    InjectProvider {
        store,
        mount_index,
        has_children,
        teardown,
    }
}

fn run_teardown(teardown: &RefCell<Option<Cleanup>>) {
    let cleanup = teardown.borrow_mut().take();
    if let Some(cleanup) = cleanup {
        cleanup();
    }
}

impl InjectProvider {
    /// A handle to pass to consumers.
    pub fn handle(&self) -> InjectHandle {
        self.store.handle()
    }

    pub fn store(&self) -> &InjectStore {
        &self.store
    }

    /// Registry index of the mount point.
    pub fn mount_index(&self) -> usize {
        self.mount_index
    }

    pub fn is_mounted(&self) -> bool {
        self.store.is_attached()
    }

    /// The render output order: injected content first, then children.
    ///
    /// Empty once unmounted. Tracks inside effects.
    pub fn slots(&self) -> Vec<RenderSlot> {
        let Ok(entries) = self.store.injected() else {
            return Vec::new();
        };

        let mut slots: Vec<RenderSlot> = entries
            .iter()
            .map(|entry| RenderSlot::Injected(entry.key()))
            .collect();
        if self.has_children {
            slots.push(RenderSlot::Children);
        }
        slots
    }

    pub fn unmount(self) {
        drop(self);
    }

    /// Turn the provider into a component cleanup, for providers mounted
    /// inside another component's children.
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || self.unmount())
    }
}

impl Drop for InjectProvider {
    fn drop(&mut self) {
        // Already torn down by a release from outside; the index may
        // belong to someone else by now.
        let Some(teardown) = self.teardown.borrow_mut().take() else {
            return;
        };
        // Cleanups first, while their indices are still allocated.
        teardown();
        release_index(self.mount_index);
    }
}
