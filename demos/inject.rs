//! Inject Example - Toasts and dialogs injected at runtime
//!
//! This example demonstrates runtime injection:
//! - Mounting a provider and handing its handle to children
//! - Injecting tagged and anonymous content
//! - Removing content by id, purging, and unmounting
//!
//! Run with: RUST_LOG=spark_inject=debug cargo run --example inject

use std::rc::Rc;

use spark_inject::{
    allocate_index, children, get_allocated_count, get_id, inject_provider, node, noop_cleanup,
    release_index, InjectError, InjectHandle, InjectProviderProps, Node,
};
use tracing_subscriber::EnvFilter;

/// A component that prints when it mounts and unmounts.
fn toast(message: &'static str) -> Node {
    node(move || {
        let index = allocate_index(None);
        println!("  + mounted {message:?} as {}", get_id(index).unwrap_or_default());
        Box::new(move || {
            println!("  - unmounted {message:?}");
            release_index(index);
        })
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== spark-inject Example ===\n");

    // The app body keeps the handle it is given; nothing is looked up globally.
    let body_handle: Rc<std::cell::RefCell<Option<InjectHandle>>> = Rc::default();
    let body_slot = body_handle.clone();

    let provider = inject_provider(InjectProviderProps {
        id: Some("app".to_string()),
        children: Some(children(move |inject: &InjectHandle| {
            println!("  + mounted app body");
            *body_slot.borrow_mut() = Some(inject.clone());
            noop_cleanup()
        })),
    });

    let Some(inject) = body_handle.borrow().clone() else {
        return;
    };

    let _unsubscribe = match inject.subscribe(|entries| {
        println!("  ({} injected)", entries.len());
    }) {
        Ok(unsubscribe) => unsubscribe,
        Err(err) => {
            tracing::error!(%err, "could not subscribe");
            return;
        }
    };

    println!("\n--- Injecting ---\n");
    for (message, id) in [
        ("Saved", Some("saved")),
        ("Working...", None),
        ("Unsaved changes", Some("dialog")),
    ] {
        if let Err(err) = inject.inject(toast(message), id) {
            tracing::error!(%err, "inject failed");
        }
    }
    println!("  slots: {:?}", provider.slots());

    println!("\n--- Duplicate id ---\n");
    if let Err(err) = inject.inject(toast("Saved again"), Some("saved")) {
        println!("  error: {err}");
    }

    println!("\n--- Uninjecting \"saved\" ---\n");
    if let Err(err) = inject.uninject("saved") {
        tracing::error!(%err, "uninject failed");
    }
    println!("  slots: {:?}", provider.slots());

    println!("\n--- Purging ---\n");
    if let Err(err) = inject.purge() {
        tracing::error!(%err, "purge failed");
    }

    println!("\n--- Unmounting ---\n");
    if let Err(err) = inject.inject(toast("Goodbye"), None) {
        tracing::error!(%err, "inject failed");
    }
    provider.unmount();

    match inject.inject(toast("Too late"), None) {
        Err(InjectError::Detached) => println!("  handle detached, as expected"),
        other => println!("  unexpected: {other:?}"),
    }
    println!("  components still allocated: {}", get_allocated_count());

    println!("\n=== Done ===");
}
