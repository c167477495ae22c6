//! Admin-only handlers. Every route requires an authenticated session and
//! checks a permission from the session snapshot.

pub mod audit;
pub mod security;
pub mod sessions;
