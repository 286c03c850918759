use log::debug;
use std::sync::Arc;

use super::members_model::{Member, MemberUpdate, NewMember};
use super::members_traits::{MemberRepositoryTrait, MemberServiceTrait};
use crate::errors::{Error, Result};
use crate::utils::pagination::{normalize_search, PageRequest, Paginated};

/// Service for the owner-scoped member directory.
pub struct MemberService {
    repository: Arc<dyn MemberRepositoryTrait>,
}

impl MemberService {
    pub fn new(repository: Arc<dyn MemberRepositoryTrait>) -> Self {
        Self { repository }
    }
}

fn duplicate_phone(err: Error) -> Error {
    if err.is_unique_violation() {
        Error::Conflict("A member with this phone number already exists".to_string())
    } else {
        err
    }
}

#[async_trait::async_trait]
impl MemberServiceTrait for MemberService {
    async fn create_member(&self, owner_id: &str, new_member: NewMember) -> Result<Member> {
        new_member.validate()?;
        debug!("Creating member for owner {}", owner_id);
        self.repository
            .create(owner_id, new_member)
            .await
            .map_err(duplicate_phone)
    }

    fn get_member(&self, owner_id: &str, member_id: &str) -> Result<Member> {
        self.repository.get_by_id(owner_id, member_id)
    }

    fn list_members(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<Member>> {
        let search = normalize_search(search);
        self.repository.list(owner_id, page, search.as_deref())
    }

    async fn update_member(
        &self,
        owner_id: &str,
        member_id: &str,
        update: MemberUpdate,
    ) -> Result<Member> {
        update.validate()?;
        let mut member = self.repository.get_by_id(owner_id, member_id)?;
        update.apply_to(&mut member);
        self.repository
            .update(owner_id, member)
            .await
            .map_err(duplicate_phone)
    }

    async fn delete_member(&self, owner_id: &str, member_id: &str) -> Result<()> {
        let deleted = self.repository.delete(owner_id, member_id).await?;
        if deleted == 0 {
            return Err(Error::not_found(format!(
                "User with ID {} not found",
                member_id
            )));
        }
        Ok(())
    }
}
