//! Administrator account entities.

pub mod model;
pub mod role;

pub use model::{AdminAccount, AdminProfile};
pub use role::Role;
