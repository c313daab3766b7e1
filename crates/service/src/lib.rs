//! Service layer for the salon backend.
//! - Booking workflow, payment ledger and reminder scheduling behind a repository trait.
//! - Catalog and client directory operations over the `models` entities.
//! - Framework-independent: callers pass an explicit `Principal`/`Role`.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod client_service;
pub mod catalog_service;
pub mod booking;
pub mod notifications;
#[cfg(test)]
pub mod test_support;
