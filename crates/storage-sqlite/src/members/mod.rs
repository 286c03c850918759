//! SQLite storage implementation for the member directory.

mod model;
mod repository;

pub use model::UserDB;
pub use repository::MemberRepository;
pub(crate) use repository::committee_profiles;
