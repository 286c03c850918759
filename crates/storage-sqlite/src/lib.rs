//! SQLite storage implementation for CommiPay.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `commipay-core` and contains:
//! - Database connection pooling and the single writer actor
//! - Embedded Diesel migrations
//! - Repository implementations for members, committees and the installment ledger
//! - Raw SQL aggregation pipelines for reporting
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The `core` crate is database-agnostic and works with traits.
//!
//! ```text
//!   server (axum)
//!        │
//!        ▼
//!   core (domain, services, traits)
//!        │
//!        ▼
//!   storage-sqlite (this crate)
//!        │
//!        ▼
//!    SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod analytics;
pub mod committees;
pub mod installments;
pub mod members;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from commipay-core for convenience
pub use commipay_core::errors::{DatabaseError, Error, Result};
