//! Mount Registry - Index allocation for mounted components.
//!
//! Every component that renders (a provider's mount point, an injected
//! node, a provider child) is identified by an index:
//! - ID ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Parent links, recorded from the parent context at allocation time
//! - Parent context stack for nested component creation
//! - Destroy callbacks, run when an index is released

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map component ID to index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Map index to component ID.
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Allocated indices and their parent (None at the root).
    /// Ordered so child lists come back in allocation-slot order.
    static PARENTS: RefCell<BTreeMap<usize, Option<usize>>> = RefCell::new(BTreeMap::new());

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Stack of parent indices for nested component creation.
    static PARENT_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Destroy callbacks registered per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Parent Context Stack
// =============================================================================

/// Get current parent index (None if at root).
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a parent index onto the stack.
pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index))
}

/// Pop a parent index from the stack.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    })
}

/// Run `f` with `parent` as the current parent context.
///
/// A `None` parent leaves the stack untouched.
pub fn with_parent_context<R>(parent: Option<usize>, f: impl FnOnce() -> R) -> R {
    if let Some(parent) = parent {
        push_parent_context(parent);
    }
    let result = f();
    if parent.is_some() {
        pop_parent_context();
    }
    result
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new component.
///
/// The component is parented to the current parent context. Allocating an
/// ID that is already registered returns the existing index.
pub fn allocate_index(id: Option<&str>) -> usize {
    let component_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("c{}", *counter);
            *counter += 1;
            id
        }),
    };

    if let Some(index) = get_index(&component_id) {
        return index;
    }

    let index = FREE_INDICES.with(|free| free.borrow_mut().pop()).unwrap_or_else(|| {
        NEXT_INDEX.with(|next| {
            let mut next = next.borrow_mut();
            let index = *next;
            *next += 1;
            index
        })
    });

    let parent = get_current_parent_index();
    ID_TO_INDEX.with(|map| map.borrow_mut().insert(component_id.clone(), index));
    INDEX_TO_ID.with(|map| map.borrow_mut().insert(index, component_id));
    PARENTS.with(|parents| parents.borrow_mut().insert(index, parent));

    index
}

/// Release an index back to the pool.
///
/// Children are released first, depth first, so their destroy callbacks
/// run before the parent's.
pub fn release_index(index: usize) {
    if !is_allocated(index) {
        return;
    }

    for child in get_children(index) {
        release_index(child);
    }

    run_destroy_callbacks(index);

    if let Some(id) = INDEX_TO_ID.with(|map| map.borrow_mut().remove(&index)) {
        ID_TO_INDEX.with(|map| map.borrow_mut().remove(&id));
    }
    PARENTS.with(|parents| parents.borrow_mut().remove(&index));
    FREE_INDICES.with(|free| free.borrow_mut().push(index));

    // Everything released: start numbering from zero again.
    if get_allocated_count() == 0 {
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

// =============================================================================
// Destroy Callbacks
// =============================================================================

/// Register a callback to run when the component at `index` is destroyed.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    for callback in callbacks.into_iter().flatten() {
        callback();
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for a component ID.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Get ID for an index.
pub fn get_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// Get the parent of an allocated index.
pub fn get_parent_index(index: usize) -> Option<usize> {
    PARENTS.with(|parents| parents.borrow().get(&index).copied().flatten())
}

/// Get the direct children of an index.
pub fn get_children(index: usize) -> Vec<usize> {
    PARENTS.with(|parents| {
        parents
            .borrow()
            .iter()
            .filter(|(_, parent)| **parent == Some(index))
            .map(|(child, _)| *child)
            .collect()
    })
}

/// Get all currently allocated indices.
pub fn get_allocated_indices() -> Vec<usize> {
    PARENTS.with(|parents| parents.borrow().keys().copied().collect())
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    PARENTS.with(|parents| parents.borrow().contains_key(&index))
}

/// Get the count of currently allocated components.
pub fn get_allocated_count() -> usize {
    PARENTS.with(|parents| parents.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    PARENTS.with(|parents| parents.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
}
