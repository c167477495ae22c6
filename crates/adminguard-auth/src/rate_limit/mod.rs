//! Per-key login attempt limiting.

pub mod limiter;
pub mod memory;

pub use limiter::{Admission, RateLimiter};
pub use memory::MemoryCounterStore;
