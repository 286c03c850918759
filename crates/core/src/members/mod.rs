//! Members module - the owner-scoped member directory.

mod members_model;
mod members_service;
mod members_traits;


pub use members_model::{Member, MemberSummary, MemberUpdate, NewMember};
pub use members_service::MemberService;
pub use members_traits::{MemberRepositoryTrait, MemberServiceTrait};
