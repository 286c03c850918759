//! CommiPay Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for running rotating-savings
//! committees: committee lifecycle, the installment & payment engine, the
//! member directory and read-only reporting.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod analytics;
pub mod committees;
pub mod constants;
pub mod errors;
pub mod installments;
pub mod members;
pub mod owner;
pub mod utils;

pub use owner::{Owner, Role};
pub use utils::pagination::{PageRequest, Paginated};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
