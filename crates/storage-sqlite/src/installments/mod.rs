//! SQLite storage implementation for installments and payment obligations.

mod model;
mod repository;

pub use model::{InstallmentDB, InstallmentPaymentDB};
pub use repository::InstallmentRepository;
