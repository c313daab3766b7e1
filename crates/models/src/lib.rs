//! SeaORM entities for the salon backend, with write-time validation helpers.
//!
//! Every entity module exposes its `Model`/`ActiveModel` plus small
//! constructors that validate input before touching the database.

pub mod errors;
pub mod db;
pub mod client;
pub mod client_interaction;
pub mod client_loyalty;
pub mod catalog;
pub mod appointment;
pub mod payment;
pub mod reminder;

#[cfg(test)]
mod tests;
