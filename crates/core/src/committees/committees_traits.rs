//! Committee repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::committees_model::{Committee, CommitteeDetails, CommitteeUpdate, NewCommittee};
use crate::errors::Result;
use crate::utils::pagination::{PageRequest, Paginated};

/// Trait defining the contract for committee persistence.
///
/// All lookups are scoped to `owner_id`; a committee owned by another
/// account yields `Error::NotFound`.
#[async_trait]
pub trait CommitteeRepositoryTrait: Send + Sync {
    /// Persists the committee and its ordered member set.
    async fn create(
        &self,
        owner_id: &str,
        new_committee: NewCommittee,
        end_date: NaiveDate,
    ) -> Result<Committee>;

    fn get_by_id(&self, owner_id: &str, committee_id: &str) -> Result<Committee>;

    /// Committee with member profiles resolved.
    fn get_details(&self, owner_id: &str, committee_id: &str) -> Result<CommitteeDetails>;

    /// Newest first. `amount` filters by exact pool amount.
    fn list(
        &self,
        owner_id: &str,
        page: PageRequest,
        amount: Option<Decimal>,
    ) -> Result<Paginated<Committee>>;

    /// Replaces the stored fields and member set with `committee`'s.
    async fn update(&self, owner_id: &str, committee: Committee) -> Result<Committee>;

    /// Deletes the committee together with its installments and payment
    /// obligations in one transaction. Returns the number of committees removed.
    async fn delete(&self, owner_id: &str, committee_id: &str) -> Result<usize>;
}

/// Trait defining the contract for committee lifecycle operations.
#[async_trait]
pub trait CommitteeServiceTrait: Send + Sync {
    async fn create_committee(&self, owner_id: &str, new_committee: NewCommittee)
        -> Result<Committee>;

    fn list_committees(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<Committee>>;

    fn get_committee(&self, owner_id: &str, committee_id: &str) -> Result<CommitteeDetails>;

    async fn update_committee(
        &self,
        owner_id: &str,
        committee_id: &str,
        update: CommitteeUpdate,
    ) -> Result<CommitteeDetails>;

    async fn delete_committee(&self, owner_id: &str, committee_id: &str) -> Result<()>;
}
