use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use std::sync::Arc;
use uuid::Uuid;

use commipay_core::errors::{Error, Result};
use commipay_core::members::{Member, MemberRepositoryTrait, NewMember};
use commipay_core::{PageRequest, Paginated, Role};

use super::model::{into_members, UserDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{committee_members, users};
use crate::utils::like_pattern;

pub struct MemberRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MemberRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        MemberRepository { pool, writer }
    }
}

fn member_not_found(member_id: &str) -> Error {
    Error::not_found(format!("User with ID {} not found", member_id))
}

fn owned_members<'a>(owner_id: &'a str, pattern: Option<&'a str>) -> users::BoxedQuery<'a, Sqlite> {
    let mut query = users::table
        .filter(users::created_by.eq(owner_id))
        .into_boxed();
    if let Some(pattern) = pattern {
        query = query.filter(
            users::first_name
                .like(pattern)
                .escape('\\')
                .or(users::last_name.like(pattern).escape('\\'))
                .or(users::phone_number.like(pattern).escape('\\')),
        );
    }
    query
}

/// Profiles of a committee's members in committee order.
pub(crate) fn committee_profiles(
    conn: &mut SqliteConnection,
    committee_id: &str,
) -> Result<Vec<Member>> {
    let rows = committee_members::table
        .inner_join(users::table)
        .filter(committee_members::committee_id.eq(committee_id))
        .order(committee_members::position.asc())
        .select(UserDB::as_select())
        .load::<UserDB>(conn)
        .map_err(StorageError::from)?;
    into_members(rows)
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn create(&self, owner_id: &str, new_member: NewMember) -> Result<Member> {
        let now = Utc::now().naive_utc();
        let row = UserDB {
            id: Uuid::new_v4().to_string(),
            first_name: new_member.first_name,
            last_name: new_member.last_name,
            email: new_member.email,
            avatar_url: new_member.avatar_url,
            country_code: new_member.country_code,
            phone_number: new_member.phone_number,
            role: Role::Member.as_str().to_string(),
            is_active: true,
            created_by: Some(owner_id.to_string()),
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Member> {
                let inserted = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Member::try_from(inserted)
            })
            .await
    }

    fn get_by_id(&self, owner_id: &str, member_id: &str) -> Result<Member> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::id.eq(member_id))
            .filter(users::created_by.eq(owner_id))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| member_not_found(member_id))?;
        Member::try_from(row)
    }

    fn list(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<Member>> {
        let pattern = search.map(like_pattern);
        let mut conn = get_connection(&self.pool)?;

        let (rows, total) = conn
            .transaction::<_, StorageError, _>(|conn| {
                let total: i64 = owned_members(owner_id, pattern.as_deref())
                    .count()
                    .get_result(conn)?;
                let rows = owned_members(owner_id, pattern.as_deref())
                    .select(UserDB::as_select())
                    .order((users::first_name.asc(), users::last_name.asc(), users::id.asc()))
                    .limit(page.limit)
                    .offset(page.offset())
                    .load::<UserDB>(conn)?;
                Ok((rows, total))
            })?;

        Ok(Paginated::new(into_members(rows)?, total, page))
    }

    async fn update(&self, owner_id: &str, member: Member) -> Result<Member> {
        let owner_id = owner_id.to_string();
        let member_id = member.id.clone();
        let mut row = UserDB::from(member);
        row.updated_at = Utc::now().naive_utc();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Member> {
                let updated = diesel::update(
                    users::table
                        .filter(users::id.eq(&member_id))
                        .filter(users::created_by.eq(&owner_id)),
                )
                .set(&row)
                .returning(UserDB::as_returning())
                .get_result(conn)
                .optional()
                .map_err(StorageError::from)?
                .ok_or_else(|| member_not_found(&member_id))?;
                Member::try_from(updated)
            })
            .await
    }

    async fn delete(&self, owner_id: &str, member_id: &str) -> Result<usize> {
        let owner_id = owner_id.to_string();
        let member_id = member_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    users::table
                        .filter(users::id.eq(member_id))
                        .filter(users::created_by.eq(owner_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, TestDb};

    fn setup() -> (MemberRepository, TestDb) {
        let db = test_support::setup();
        (MemberRepository::new(db.pool.clone(), db.writer.clone()), db)
    }

    fn new_member(first_name: &str, last_name: &str, phone: &str) -> NewMember {
        NewMember {
            first_name: first_name.to_string(),
            last_name: Some(last_name.to_string()),
            email: None,
            avatar_url: None,
            country_code: "+92".to_string(),
            phone_number: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_is_owner_scoped() {
        let (repo, _dir) = setup();
        let member = repo
            .create("owner-1", new_member("Ali", "Raza", "3001112222"))
            .await
            .unwrap();
        assert_eq!(member.role, Role::Member);
        assert_eq!(member.created_by.as_deref(), Some("owner-1"));

        assert_eq!(repo.get_by_id("owner-1", &member.id).unwrap(), member);
        assert!(repo.get_by_id("owner-2", &member.id).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_phone_per_owner_is_unique_violation() {
        let (repo, _dir) = setup();
        repo.create("owner-1", new_member("Ali", "Raza", "3001112222"))
            .await
            .unwrap();
        let err = repo
            .create("owner-1", new_member("Sana", "Mir", "3001112222"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        repo.create("owner-2", new_member("Sana", "Mir", "3001112222"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_searches_names_and_phone() {
        let (repo, _dir) = setup();
        repo.create("owner-1", new_member("Ali", "Raza", "3001112222"))
            .await
            .unwrap();
        repo.create("owner-1", new_member("Sana", "Alvi", "3009998888"))
            .await
            .unwrap();
        repo.create("owner-1", new_member("Bilal", "Khalid", "3005556666"))
            .await
            .unwrap();
        let page = PageRequest::new(1, 20);

        let all = repo.list("owner-1", page, None).unwrap();
        assert_eq!(all.total, 3);
        let names: Vec<&str> = all.data.iter().map(|m| m.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ali", "Bilal", "Sana"]);

        let by_name = repo.list("owner-1", page, Some("ALI")).unwrap();
        assert_eq!(by_name.total, 2);

        let by_phone = repo.list("owner-1", page, Some("5556")).unwrap();
        assert_eq!(by_phone.total, 1);
        assert_eq!(by_phone.data[0].first_name, "Bilal");

        let wildcard = repo.list("owner-1", page, Some("%")).unwrap();
        assert_eq!(wildcard.total, 0);

        let second_page = repo.list("owner-1", PageRequest::new(2, 2), None).unwrap();
        assert_eq!(second_page.total, 3);
        assert_eq!(second_page.data.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (repo, _dir) = setup();
        let mut member = repo
            .create("owner-1", new_member("Ali", "Raza", "3001112222"))
            .await
            .unwrap();
        member.last_name = None;
        member.is_active = false;
        let updated = repo.update("owner-1", member.clone()).await.unwrap();
        assert_eq!(updated.last_name, None);
        assert!(!updated.is_active);

        assert!(repo.update("owner-2", member.clone()).await.unwrap_err().is_not_found());
        assert_eq!(repo.delete("owner-2", &member.id).await.unwrap(), 0);
        assert_eq!(repo.delete("owner-1", &member.id).await.unwrap(), 1);
    }
}
