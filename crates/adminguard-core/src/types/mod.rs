//! Core type definitions used across the AdminGuard workspace.

pub mod clock;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::*;
