//! Booking workflow: appointment creation with its reservation payment and
//! reminders, status transitions, the payment ledger, and soft delete.
//!
//! Layers follow domain → repository → service. `repository::mock` holds an
//! in-memory implementation for tests and benches; `repo::seaorm` is the
//! PostgreSQL one.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{ActiveFilter, Balance, BookingPolicy, BookingReceipt, BookingRequest, CompletionReceipt, DueReminder, ReminderRule};
pub use repository::BookingRepository;
pub use service::BookingService;
