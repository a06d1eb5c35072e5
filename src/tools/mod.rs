/// Tools Module
///
/// Every tool lives in its own module and exposes a `register` function.
/// `register_all` builds the registry the server runs with.

pub mod arithmetic;
pub mod reverse;
pub mod save_conversation;
pub mod validation;

use std::sync::Arc;

use crate::core::registry::ToolRegistry;
use save_conversation::ArchiveClient;

/// Build the immutable registry of every tool this server exposes.
pub fn register_all(archive: ArchiveClient) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    arithmetic::register(&mut registry);
    reverse::register(&mut registry);
    save_conversation::register(&mut registry, archive);
    registry.into_shared()
}
