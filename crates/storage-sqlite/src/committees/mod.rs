//! SQLite storage implementation for committees.

mod model;
mod repository;

pub use model::{CommitteeDB, CommitteeMemberDB};
pub use repository::CommitteeRepository;
