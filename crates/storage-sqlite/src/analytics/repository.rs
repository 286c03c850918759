use diesel::dsl::count;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use std::sync::Arc;

use commipay_core::analytics::{
    AnalyticsRepositoryTrait, PendingMember, PendingPaymentGroup, PendingPaymentsReport,
};
use commipay_core::errors::Result;
use commipay_core::installments::PaymentStatus;
use commipay_core::{PageRequest, Paginated};

use super::model::{CountRow, PendingGroupRow, PendingMemberRow, PendingSummaryRow};
use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::{committees, installment_payments, users};
use crate::utils::like_pattern;

/// Pending obligations of one member joined to installment and committee.
/// Binds: owner, member.
const MEMBER_PENDING_FROM: &str = r#"
    FROM installment_payments p
    JOIN installments i ON i.id = p.installment_id
    JOIN committees c ON c.id = i.committee_id
    WHERE p.created_by = ?1
      AND p.member_id = ?2
      AND p.status = 'PENDING'"#;

/// Per-member positive pending balances with profile fields.
/// Binds: owner, optional search pattern.
const PENDING_MEMBERS_CTE: &str = r#"
    WITH pending AS (
        SELECT p.member_id,
               MAX(COALESCE(i.monthly_contribution, 0) - p.amount_paid, 0) AS pending_amount
        FROM installment_payments p
        JOIN installments i ON i.id = p.installment_id
        WHERE p.created_by = ?1
          AND p.status = 'PENDING'
    ),
    per_member AS (
        SELECT member_id,
               SUM(pending_amount) AS total_pending_amount,
               COUNT(*) AS pending_count
        FROM pending
        WHERE pending_amount > 0
        GROUP BY member_id
    ),
    matched AS (
        SELECT u.id, u.first_name, u.last_name, u.country_code, u.phone_number,
               pm.total_pending_amount, pm.pending_count
        FROM per_member pm
        JOIN users u ON u.id = pm.member_id
        WHERE ?2 IS NULL
           OR REPLACE(LOWER(u.first_name), ' ', '') LIKE ?2 ESCAPE '\'
           OR REPLACE(LOWER(COALESCE(u.last_name, '')), ' ', '') LIKE ?2 ESCAPE '\'
           OR REPLACE(LOWER(u.phone_number), ' ', '') LIKE ?2 ESCAPE '\'
    )"#;

pub struct AnalyticsRepository {
    pool: Arc<DbPool>,
}

impl AnalyticsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        AnalyticsRepository { pool }
    }
}

/// Whitespace-free LIKE pattern matching the normalized columns.
///
/// SQLite's `LOWER()` folds ASCII only, so non-ASCII letters are kept as typed.
fn compact_pattern(search: &str) -> String {
    let compact: String = search
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    like_pattern(&compact)
}

impl AnalyticsRepositoryTrait for AnalyticsRepository {
    fn pending_payments_report(
        &self,
        owner_id: &str,
        member_id: &str,
    ) -> Result<PendingPaymentsReport> {
        let mut conn = get_connection(&self.pool)?;

        let group_sql = format!(
            r#"SELECT c.id AS committee_id,
                   c.amount AS committee_amount,
                   c.monthly_due_day,
                   i.id AS installment_id,
                   i.starting_bid,
                   i.winning_bid_amount,
                   COALESCE(i.monthly_contribution, 0) AS monthly_contribution,
                   COUNT(*) AS pending_count,
                   SUM(MAX(COALESCE(i.monthly_contribution, 0) - p.amount_paid, 0)) AS total_pending_amount
            {MEMBER_PENDING_FROM}
            GROUP BY c.id, i.id
            ORDER BY i.year, i.month, c.id"#
        );
        let summary_sql = format!(
            r#"SELECT COALESCE(SUM(MAX(COALESCE(i.monthly_contribution, 0) - p.amount_paid, 0)), 0) AS total_pending_amount,
                   COUNT(*) AS total_pending_count
            {MEMBER_PENDING_FROM}"#
        );

        let (rows, summary) = conn.transaction::<_, StorageError, _>(|conn| {
            let rows = sql_query(&group_sql)
                .bind::<Text, _>(owner_id)
                .bind::<Text, _>(member_id)
                .load::<PendingGroupRow>(conn)?;
            let summary = sql_query(&summary_sql)
                .bind::<Text, _>(owner_id)
                .bind::<Text, _>(member_id)
                .get_result::<PendingSummaryRow>(conn)?;
            Ok((rows, summary))
        })?;

        let groups = rows
            .into_iter()
            .map(PendingPaymentGroup::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(PendingPaymentsReport {
            groups,
            summary: summary.into(),
        })
    }

    fn count_committees(&self, owner_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(committees::table
            .filter(committees::created_by.eq(owner_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn count_members(&self, owner_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .filter(users::created_by.eq(owner_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn count_members_with_pending(&self, owner_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(installment_payments::table
            .filter(installment_payments::created_by.eq(owner_id))
            .filter(installment_payments::status.eq(PaymentStatus::Pending.as_str()))
            .select(count(installment_payments::member_id).aggregate_distinct())
            .first::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn list_pending_members(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<PendingMember>> {
        let pattern = search.map(compact_pattern);
        let mut conn = get_connection(&self.pool)?;

        let count_sql = format!("{PENDING_MEMBERS_CTE} SELECT COUNT(*) AS total FROM matched");
        let page_sql = format!(
            "{PENDING_MEMBERS_CTE} SELECT * FROM matched \
             ORDER BY first_name, last_name, id LIMIT ?3 OFFSET ?4"
        );

        let (rows, total) = conn.transaction::<_, StorageError, _>(|conn| {
            let total = sql_query(&count_sql)
                .bind::<Text, _>(owner_id)
                .bind::<Nullable<Text>, _>(pattern.as_deref())
                .get_result::<CountRow>(conn)?
                .total;
            let rows = sql_query(&page_sql)
                .bind::<Text, _>(owner_id)
                .bind::<Nullable<Text>, _>(pattern.as_deref())
                .bind::<BigInt, _>(page.limit)
                .bind::<BigInt, _>(page.offset())
                .load::<PendingMemberRow>(conn)?;
            Ok((rows, total))
        })?;

        let data = rows.into_iter().map(PendingMember::from).collect();
        Ok(Paginated::new(data, total, page))
    }
}
