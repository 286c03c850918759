use log::{debug, info};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::committees_model::{Committee, CommitteeDetails, CommitteeUpdate, NewCommittee};
use super::committees_traits::{CommitteeRepositoryTrait, CommitteeServiceTrait};
use crate::errors::{Error, Result};
use crate::utils::pagination::{normalize_search, PageRequest, Paginated};

/// Service for the committee lifecycle.
pub struct CommitteeService {
    repository: Arc<dyn CommitteeRepositoryTrait>,
}

impl CommitteeService {
    pub fn new(repository: Arc<dyn CommitteeRepositoryTrait>) -> Self {
        Self { repository }
    }
}

fn committee_not_found(committee_id: &str) -> impl FnOnce(Error) -> Error + '_ {
    move |err| {
        if err.is_not_found() {
            Error::not_found(format!("Committee with id {} not found", committee_id))
        } else {
            err
        }
    }
}

#[async_trait::async_trait]
impl CommitteeServiceTrait for CommitteeService {
    async fn create_committee(
        &self,
        owner_id: &str,
        new_committee: NewCommittee,
    ) -> Result<Committee> {
        new_committee.validate()?;
        let end_date = new_committee.end_date()?;
        debug!(
            "Creating committee for owner {} with {} members, ending {}",
            owner_id,
            new_committee.members.len(),
            end_date
        );
        let committee = self
            .repository
            .create(owner_id, new_committee, end_date)
            .await?;
        info!("Committee {} created", committee.id);
        Ok(committee)
    }

    fn list_committees(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<Committee>> {
        match normalize_search(search) {
            None => self.repository.list(owner_id, page, None),
            Some(term) => match Decimal::from_str(&term) {
                Ok(amount) => self.repository.list(owner_id, page, Some(amount)),
                // Only numeric amounts are searchable.
                Err(_) => Ok(Paginated::new(Vec::new(), 0, page)),
            },
        }
    }

    fn get_committee(&self, owner_id: &str, committee_id: &str) -> Result<CommitteeDetails> {
        self.repository
            .get_details(owner_id, committee_id)
            .map_err(committee_not_found(committee_id))
    }

    async fn update_committee(
        &self,
        owner_id: &str,
        committee_id: &str,
        update: CommitteeUpdate,
    ) -> Result<CommitteeDetails> {
        update.validate()?;
        let mut committee = self
            .repository
            .get_by_id(owner_id, committee_id)
            .map_err(committee_not_found(committee_id))?;
        update.apply_to(&mut committee)?;

        self.repository
            .update(owner_id, committee)
            .await
            .map_err(committee_not_found(committee_id))?;
        debug!("Committee {} updated", committee_id);
        self.get_committee(owner_id, committee_id)
    }

    async fn delete_committee(&self, owner_id: &str, committee_id: &str) -> Result<()> {
        let deleted = self.repository.delete(owner_id, committee_id).await?;
        if deleted == 0 {
            return Err(Error::not_found(format!(
                "Committee with id {} not found",
                committee_id
            )));
        }
        info!("Committee {} deleted", committee_id);
        Ok(())
    }
}
