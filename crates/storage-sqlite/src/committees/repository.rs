use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use commipay_core::committees::{
    Committee, CommitteeDetails, CommitteeRepositoryTrait, NewCommittee,
};
use commipay_core::errors::{Error, Result};
use commipay_core::{PageRequest, Paginated};

use super::model::{membership_rows, CommitteeDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::members::committee_profiles;
use crate::schema::{committee_members, committees, installment_payments, installments, users};
use crate::utils::{chunk_for_sqlite, decimal_to_text};

pub struct CommitteeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CommitteeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CommitteeRepository { pool, writer }
    }
}

fn committee_not_found(committee_id: &str) -> Error {
    Error::not_found(format!("Committee with id {} not found", committee_id))
}

pub(crate) fn find_owned(
    conn: &mut SqliteConnection,
    owner_id: &str,
    committee_id: &str,
) -> Result<CommitteeDB> {
    committees::table
        .filter(committees::id.eq(committee_id))
        .filter(committees::created_by.eq(owner_id))
        .select(CommitteeDB::as_select())
        .first::<CommitteeDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| committee_not_found(committee_id))
}

fn member_ids(conn: &mut SqliteConnection, committee_id: &str) -> Result<Vec<String>> {
    Ok(committee_members::table
        .filter(committee_members::committee_id.eq(committee_id))
        .order(committee_members::position.asc())
        .select(committee_members::member_id)
        .load::<String>(conn)
        .map_err(StorageError::from)?)
}

fn member_ids_by_committee(
    conn: &mut SqliteConnection,
    committee_ids: &[String],
) -> Result<HashMap<String, Vec<String>>> {
    let mut by_committee: HashMap<String, Vec<String>> = HashMap::new();
    for chunk in chunk_for_sqlite(committee_ids) {
        let rows = committee_members::table
            .filter(committee_members::committee_id.eq_any(chunk))
            .order((
                committee_members::committee_id.asc(),
                committee_members::position.asc(),
            ))
            .select((committee_members::committee_id, committee_members::member_id))
            .load::<(String, String)>(conn)
            .map_err(StorageError::from)?;
        for (committee_id, member_id) in rows {
            by_committee.entry(committee_id).or_default().push(member_id);
        }
    }
    Ok(by_committee)
}

/// Every member must exist in the owner's directory.
fn ensure_members_owned(
    conn: &mut SqliteConnection,
    owner_id: &str,
    members: &[String],
) -> Result<()> {
    let mut found: i64 = 0;
    for chunk in chunk_for_sqlite(members) {
        found += users::table
            .filter(users::id.eq_any(chunk))
            .filter(users::created_by.eq(owner_id))
            .count()
            .get_result::<i64>(conn)
            .map_err(StorageError::from)?;
    }
    if found != members.len() as i64 {
        return Err(Error::invalid_input(
            "One or more committee members do not exist",
        ));
    }
    Ok(())
}

fn replace_members(
    conn: &mut SqliteConnection,
    committee_id: &str,
    members: &[String],
) -> Result<()> {
    diesel::delete(
        committee_members::table.filter(committee_members::committee_id.eq(committee_id)),
    )
    .execute(conn)
    .map_err(StorageError::from)?;
    diesel::insert_into(committee_members::table)
        .values(&membership_rows(committee_id, members))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

fn owned_committees<'a>(
    owner_id: &'a str,
    amount: Option<String>,
) -> committees::BoxedQuery<'a, Sqlite> {
    let mut query = committees::table
        .filter(committees::created_by.eq(owner_id))
        .into_boxed();
    if let Some(amount) = amount {
        query = query.filter(committees::amount.eq(amount));
    }
    query
}

#[async_trait]
impl CommitteeRepositoryTrait for CommitteeRepository {
    async fn create(
        &self,
        owner_id: &str,
        new_committee: NewCommittee,
        end_date: NaiveDate,
    ) -> Result<Committee> {
        let now = Utc::now().naive_utc();
        let committee = Committee {
            id: Uuid::new_v4().to_string(),
            amount: new_committee.amount,
            bid: new_committee.bid,
            start_date: new_committee.start_date,
            end_date,
            monthly_due_day: new_committee.monthly_due_day,
            members: new_committee.members,
            created_by: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Committee> {
                ensure_members_owned(conn, &committee.created_by, &committee.members)?;
                diesel::insert_into(committees::table)
                    .values(&CommitteeDB::from_domain(&committee))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::insert_into(committee_members::table)
                    .values(&membership_rows(&committee.id, &committee.members))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(committee)
            })
            .await
    }

    fn get_by_id(&self, owner_id: &str, committee_id: &str) -> Result<Committee> {
        let mut conn = get_connection(&self.pool)?;
        let row = find_owned(&mut conn, owner_id, committee_id)?;
        let members = member_ids(&mut conn, committee_id)?;
        row.into_domain(members)
    }

    fn get_details(&self, owner_id: &str, committee_id: &str) -> Result<CommitteeDetails> {
        let mut conn = get_connection(&self.pool)?;
        let row = find_owned(&mut conn, owner_id, committee_id)?;
        let members = committee_profiles(&mut conn, committee_id)?;
        let member_ids = members.iter().map(|m| m.id.clone()).collect();
        Ok(CommitteeDetails::from_committee(
            row.into_domain(member_ids)?,
            members,
        ))
    }

    fn list(
        &self,
        owner_id: &str,
        page: PageRequest,
        amount: Option<Decimal>,
    ) -> Result<Paginated<Committee>> {
        let amount = amount.map(decimal_to_text);
        let mut conn = get_connection(&self.pool)?;

        let (rows, total, mut members) = conn.transaction::<_, StorageError, _>(|conn| {
            let total: i64 = owned_committees(owner_id, amount.clone())
                .count()
                .get_result(conn)?;
            let rows = owned_committees(owner_id, amount.clone())
                .select(CommitteeDB::as_select())
                .order((committees::created_at.desc(), committees::id.desc()))
                .limit(page.limit)
                .offset(page.offset())
                .load::<CommitteeDB>(conn)?;
            let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
            let members = member_ids_by_committee(conn, &ids)?;
            Ok((rows, total, members))
        })?;

        let data = rows
            .into_iter()
            .map(|row| {
                let ids = members.remove(&row.id).unwrap_or_default();
                row.into_domain(ids)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Paginated::new(data, total, page))
    }

    async fn update(&self, owner_id: &str, committee: Committee) -> Result<Committee> {
        let owner_id = owner_id.to_string();
        let mut committee = committee;
        committee.updated_at = Utc::now().naive_utc();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Committee> {
                ensure_members_owned(conn, &owner_id, &committee.members)?;
                let updated = diesel::update(
                    committees::table
                        .filter(committees::id.eq(&committee.id))
                        .filter(committees::created_by.eq(&owner_id)),
                )
                .set(&CommitteeDB::from_domain(&committee))
                .execute(conn)
                .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(committee_not_found(&committee.id));
                }
                replace_members(conn, &committee.id, &committee.members)?;
                Ok(committee)
            })
            .await
    }

    async fn delete(&self, owner_id: &str, committee_id: &str) -> Result<usize> {
        let owner_id = owner_id.to_string();
        let committee_id = committee_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let owned = committees::table
                    .filter(committees::id.eq(&committee_id))
                    .filter(committees::created_by.eq(&owner_id))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if owned == 0 {
                    return Ok(0);
                }

                let committee_installments = installments::table
                    .filter(installments::committee_id.eq(&committee_id))
                    .select(installments::id);
                let payments = diesel::delete(
                    installment_payments::table.filter(
                        installment_payments::installment_id.eq_any(committee_installments),
                    ),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                let removed_installments = diesel::delete(
                    installments::table.filter(installments::committee_id.eq(&committee_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                diesel::delete(
                    committee_members::table
                        .filter(committee_members::committee_id.eq(&committee_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                let deleted = diesel::delete(committees::table.find(&committee_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "Committee {} removed with {} installments and {} payments",
                    committee_id, removed_installments, payments
                );
                Ok(deleted)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, insert_member, TestDb};
    use rust_decimal_macros::dec;

    const OWNER: &str = "owner-1";

    fn setup() -> (CommitteeRepository, TestDb) {
        let db = test_support::setup();
        insert_member(&db, OWNER, "m-1", "Zara", "3000000001");
        insert_member(&db, OWNER, "m-2", "Bilal", "3000000002");
        insert_member(&db, OWNER, "m-3", "Ahmed", "3000000003");
        insert_member(&db, "owner-2", "x-1", "Other", "3000000009");
        (CommitteeRepository::new(db.pool.clone(), db.writer.clone()), db)
    }

    fn new_committee(amount: Decimal, members: &[&str]) -> NewCommittee {
        NewCommittee {
            amount,
            bid: dec!(100),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            monthly_due_day: 5,
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn end_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
    }

    #[tokio::test]
    async fn test_create_keeps_member_order_and_decimal_amounts() {
        let (repo, _db) = setup();
        let created = repo
            .create(OWNER, new_committee(dec!(1000.50), &["m-3", "m-1", "m-2"]), end_date())
            .await
            .unwrap();

        let fetched = repo.get_by_id(OWNER, &created.id).unwrap();
        assert_eq!(fetched.amount, dec!(1000.5));
        assert_eq!(fetched.members, vec!["m-3", "m-1", "m-2"]);

        let details = repo.get_details(OWNER, &created.id).unwrap();
        let names: Vec<&str> = details.members.iter().map(|m| m.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ahmed", "Zara", "Bilal"]);

        assert!(repo.get_by_id("owner-2", &created.id).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_members_atomically() {
        let (repo, db) = setup();
        let err = repo
            .create(OWNER, new_committee(dec!(1000), &["m-1", "x-1"]), end_date())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut conn = get_connection(&db.pool).unwrap();
        let count: i64 = committees::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_list_filters_by_amount_newest_first() {
        let (repo, _db) = setup();
        let first = repo
            .create(OWNER, new_committee(dec!(1000), &["m-1"]), end_date())
            .await
            .unwrap();
        let second = repo
            .create(OWNER, new_committee(dec!(2000), &["m-1", "m-2"]), end_date())
            .await
            .unwrap();
        let page = PageRequest::new(1, 10);

        let all = repo.list(OWNER, page, None).unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.data[0].id, second.id);
        assert_eq!(all.data[1].id, first.id);
        assert_eq!(all.data[0].members, vec!["m-1", "m-2"]);

        let filtered = repo.list(OWNER, page, Some(dec!(1000.00))).unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.data[0].id, first.id);

        assert_eq!(repo.list("owner-2", page, None).unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_members() {
        let (repo, _db) = setup();
        let mut committee = repo
            .create(OWNER, new_committee(dec!(1000), &["m-1", "m-2"]), end_date())
            .await
            .unwrap();
        committee.members = vec!["m-2".to_string(), "m-3".to_string(), "m-1".to_string()];
        committee.monthly_due_day = 20;
        repo.update(OWNER, committee.clone()).await.unwrap();

        let fetched = repo.get_by_id(OWNER, &committee.id).unwrap();
        assert_eq!(fetched.members, vec!["m-2", "m-3", "m-1"]);
        assert_eq!(fetched.monthly_due_day, 20);

        let err = repo.update("owner-2", committee).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)) || err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_installments_and_payments() {
        let (repo, db) = setup();
        let committee = repo
            .create(OWNER, new_committee(dec!(1000), &["m-1", "m-2"]), end_date())
            .await
            .unwrap();
        {
            let mut conn = get_connection(&db.pool).unwrap();
            diesel::sql_query(format!(
                "INSERT INTO installments (id, committee_id, month, year, monthly_contribution, \
                 starting_bid, winning_bidder, winning_bid_amount, created_by) \
                 VALUES ('i-1', '{}', 9, 2025, 450, '100', 'm-1', '100', '{}')",
                committee.id, OWNER
            ))
            .execute(&mut conn)
            .unwrap();
            diesel::sql_query(
                "INSERT INTO installment_payments (id, installment_id, member_id, created_by) \
                 VALUES ('p-1', 'i-1', 'm-1', 'owner-1'), ('p-2', 'i-1', 'm-2', 'owner-1')",
            )
            .execute(&mut conn)
            .unwrap();
        }

        assert_eq!(repo.delete("owner-2", &committee.id).await.unwrap(), 0);
        assert_eq!(repo.delete(OWNER, &committee.id).await.unwrap(), 1);

        let mut conn = get_connection(&db.pool).unwrap();
        let payments: i64 = installment_payments::table.count().get_result(&mut conn).unwrap();
        let installment_rows: i64 = installments::table.count().get_result(&mut conn).unwrap();
        let memberships: i64 = committee_members::table.count().get_result(&mut conn).unwrap();
        assert_eq!((payments, installment_rows, memberships), (0, 0, 0));
    }
}
