//! `plm-auth`: identity and role boundary.
//!
//! Supplies the acting user for stage transitions and the role set callers use
//! to gate destructive operations. The product core never checks roles itself.

pub mod principal;
pub mod roles;

pub use principal::{IdentityProvider, Principal, StaticIdentity};
pub use roles::Role;
