//! Caller identity: roles, the authenticated principal, and bearer tokens.
//!
//! Business operations take a `Principal` or `Role` argument; nothing in the
//! service layer looks identity up on its own.

pub mod domain;
pub mod errors;
pub mod token;

pub use domain::{Principal, Role};
pub use token::TokenService;
