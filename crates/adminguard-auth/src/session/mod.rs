//! Session table, lifecycle and background sweep.

pub mod cleanup;
pub mod memory;
pub mod registry;
pub mod store;

pub use cleanup::{CleanupReport, SessionCleanup};
pub use memory::MemorySessionStore;
pub use registry::SessionRegistry;
pub use store::SessionStore;
