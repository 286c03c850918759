use async_trait::async_trait;

use super::members_model::{Member, MemberUpdate, NewMember};
use crate::errors::Result;
use crate::utils::pagination::{PageRequest, Paginated};

/// Trait for member repository operations.
///
/// Every method is scoped to `owner_id`: a member created by another owner
/// behaves exactly like a missing one.
#[async_trait]
pub trait MemberRepositoryTrait: Send + Sync {
    async fn create(&self, owner_id: &str, new_member: NewMember) -> Result<Member>;

    /// Returns `Error::NotFound` when absent or owned by someone else.
    fn get_by_id(&self, owner_id: &str, member_id: &str) -> Result<Member>;

    /// Case-insensitive substring search over first name, last name and phone.
    fn list(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<Member>>;

    async fn update(&self, owner_id: &str, member: Member) -> Result<Member>;

    async fn delete(&self, owner_id: &str, member_id: &str) -> Result<usize>;
}

/// Trait for member service operations.
#[async_trait]
pub trait MemberServiceTrait: Send + Sync {
    async fn create_member(&self, owner_id: &str, new_member: NewMember) -> Result<Member>;
    fn get_member(&self, owner_id: &str, member_id: &str) -> Result<Member>;
    fn list_members(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<Member>>;
    async fn update_member(
        &self,
        owner_id: &str,
        member_id: &str,
        update: MemberUpdate,
    ) -> Result<Member>;
    async fn delete_member(&self, owner_id: &str, member_id: &str) -> Result<()>;
}
