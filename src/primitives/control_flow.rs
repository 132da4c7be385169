//! Control Flow Primitives - Keyed list rendering.
//!
//! [`each`] renders one component per item of a reactive list and keeps
//! them in step with the list: new keys are rendered, vanished keys are
//! cleaned up, surviving keys are left alone.
//!
//! # Pattern: EffectScope-based Cleanup
//!
//! 1. Create an EffectScope to manage the lifetime of the list effect
//! 2. Run rendering logic inside `scope.run()`
//! 3. Register cleanup with `on_scope_dispose()`
//! 4. Return `Box::new(move || scope.stop())` as the Cleanup
//!
//! # Pattern: Parent Context Restoration
//!
//! The parent index is captured when `each()` is called and restored
//! around every render, so items created by a later signal change still
//! land under the right parent.
//!
//! # Pattern: Item Roots
//!
//! Every item renders inside its own `effect_root`, untracked. Effects the
//! item creates belong to that root, not to the list effect, so they live
//! until the item is removed instead of dying on the next list change.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use spark_signals::{effect, effect_root, effect_scope, on_scope_dispose, untrack};

use crate::engine::{get_current_parent_index, with_parent_context};
use crate::primitives::Cleanup;

/// Render a list of components reactively, tracked by key.
///
/// - New keys: `render_fn` is called and its cleanup stored
/// - Existing keys: nothing happens (no re-render on reorder)
/// - Removed keys: the stored cleanup runs and the item's root is disposed
///
/// Returns a cleanup that destroys every rendered item and stops tracking.
///
/// # Example
///
/// ```ignore
/// let entries = store.clone();
/// let cleanup = each(
///     move || entries.injected().unwrap_or_default(),
///     |entry: &Injectable, _key| (entry.node())(),
///     Injectable::key,
/// );
///
/// store.uninject("toast")?; // only the toast is destroyed
/// cleanup();
/// ```
///
/// # Duplicate Key Handling
///
/// Duplicate keys are warned about and skipped. Only the first occurrence
/// is rendered.
pub fn each<T, K, RenderF>(
    items_getter: impl Fn() -> Vec<T> + 'static,
    render_fn: RenderF,
    key_fn: impl Fn(&T) -> K + 'static,
) -> Cleanup
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + Debug + 'static,
    RenderF: Fn(&T, K) -> Cleanup + 'static,
{
    let parent_index = get_current_parent_index();
    let scope = effect_scope(false);
    let render_fn = Rc::new(render_fn);

    // Key -> Cleanup for destroying the rendered item
    let cleanups: Rc<RefCell<HashMap<K, Cleanup>>> = Rc::new(RefCell::new(HashMap::new()));
    let cleanups_effect = cleanups.clone();
    let cleanups_dispose = cleanups;

    scope.run(move || {
        let _effect_cleanup = effect(move || {
            let items = items_getter();
            let mut current_keys = HashSet::new();

            let mut fresh: Vec<(K, Cleanup)> = Vec::new();
            with_parent_context(parent_index, || {
                for item in &items {
                    let key = key_fn(item);

                    if !current_keys.insert(key.clone()) {
                        tracing::warn!(?key, "each(): duplicate key skipped; keys must be unique");
                        continue;
                    }

                    if cleanups_effect.borrow().contains_key(&key) {
                        continue;
                    }

                    // Render outside the borrow: items may touch the list again.
                    let cleanup = render_item(&render_fn, item.clone(), key.clone());
                    fresh.push((key, cleanup));
                }
            });

            let removed: Vec<Cleanup> = {
                let mut cleanup_map = cleanups_effect.borrow_mut();
                cleanup_map.extend(fresh);

                let stale: Vec<K> = cleanup_map
                    .keys()
                    .filter(|k| !current_keys.contains(*k))
                    .cloned()
                    .collect();
                stale
                    .into_iter()
                    .filter_map(|key| cleanup_map.remove(&key))
                    .collect()
            };

            for cleanup in removed {
                cleanup();
            }
        });

        on_scope_dispose(move || {
            let drained: Vec<Cleanup> = cleanups_dispose
                .borrow_mut()
                .drain()
                .map(|(_, cleanup)| cleanup)
                .collect();
            for cleanup in drained {
                cleanup();
            }
        });
    });

    Box::new(move || {
        scope.stop();
    })
}

/// Render one item under its own effect root.
///
/// The root runs synchronously, so the item is mounted when this returns.
fn render_item<T, K, RenderF>(render_fn: &Rc<RenderF>, item: T, key: K) -> Cleanup
where
    T: 'static,
    K: 'static,
    RenderF: Fn(&T, K) -> Cleanup + 'static,
{
    let rendered: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let rendered_in_root = rendered.clone();
    let render_fn = render_fn.clone();

    let dispose_root = effect_root(move || {
        let cleanup = untrack(|| render_fn(&item, key));
        *rendered_in_root.borrow_mut() = Some(cleanup);
    });

    let cleanup = rendered.borrow_mut().take();
    Box::new(move || {
        if let Some(cleanup) = cleanup {
            cleanup();
        }
        dispose_root();
    })
}

// =============================================================================
// Tests
// =============================================================================
