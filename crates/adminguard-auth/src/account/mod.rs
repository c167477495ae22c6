//! Administrator account lookup and lockout bookkeeping.

pub mod memory;
pub mod store;

pub use memory::MemoryAccountStore;
pub use store::{AccountStore, FailedLogin};
