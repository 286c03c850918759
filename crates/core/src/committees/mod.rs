//! Committees module - committee lifecycle models, services, and traits.

mod committees_model;
mod committees_service;
mod committees_traits;


pub use committees_model::{Committee, CommitteeDetails, CommitteeUpdate, NewCommittee};
pub use committees_service::CommitteeService;
pub use committees_traits::{CommitteeRepositoryTrait, CommitteeServiceTrait};
