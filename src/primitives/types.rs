//! Primitive types - Cleanup and render functions.

use std::rc::Rc;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by components.
///
/// Call this to unmount the component and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Render Functions
// =============================================================================

/// A renderable piece of UI.
///
/// Calling it mounts the content under the current parent context and
/// returns the cleanup that unmounts it. `Rc` so the same node can be
/// held by a registry and by the caller that built it.
pub type Node = Rc<dyn Fn() -> Cleanup>;

/// Children of a container, rendered once when the container mounts.
pub type Children<A> = Box<dyn FnOnce(&A) -> Cleanup>;

/// Wrap a render function into a [`Node`].
///
/// ```ignore
/// let toast = node(|| {
///     let index = allocate_index(Some("toast"));
///     Box::new(move || release_index(index))
/// });
/// ```
pub fn node(render: impl Fn() -> Cleanup + 'static) -> Node {
    Rc::new(render)
}

/// Wrap a children render function, so closures get their signature
/// (and the `Cleanup` return coercion) without annotations.
pub fn children<A>(render: impl FnOnce(&A) -> Cleanup + 'static) -> Children<A> {
    Box::new(render)
}

/// A cleanup that does nothing.
pub fn noop_cleanup() -> Cleanup {
    Box::new(|| {})
}
