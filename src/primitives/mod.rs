//! Primitives - Component building blocks.
//!
//! - [`Cleanup`] / [`Node`] - the shape of a component: a render function
//!   that mounts under the current parent and returns its cleanup
//! - [`each`] - keyed list rendering driven by a reactive getter

mod control_flow;
mod types;

pub use control_flow::each;
pub use types::*;
