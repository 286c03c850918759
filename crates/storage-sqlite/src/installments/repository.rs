use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use commipay_core::errors::{Error, Result};
use commipay_core::installments::{
    resolve_payment_transition, Installment, InstallmentPayment, InstallmentPaymentsPage,
    InstallmentRepositoryTrait, InstallmentWithBidder, NewInstallment, PaymentDetails,
    PaymentLookup, PaymentStatus, PaymentWithMember,
};
use commipay_core::members::{Member, MemberSummary};
use commipay_core::{PageRequest, Paginated};

use super::model::{InstallmentDB, InstallmentPaymentDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::members::UserDB;
use crate::schema::{committees, installment_payments, installments, users};
use crate::utils::{chunk_for_sqlite, decimal_to_text, like_pattern, SQLITE_MAX_PARAMS_CHUNK};

/// Payment rows per INSERT; each row binds nine parameters.
const PAYMENT_INSERT_BATCH: usize = SQLITE_MAX_PARAMS_CHUNK / 10;

type PaymentsWithMembers = diesel::dsl::InnerJoin<installment_payments::table, users::table>;

pub struct InstallmentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InstallmentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        InstallmentRepository { pool, writer }
    }
}

/// Installment whose committee belongs to `owner_id`.
fn find_owned(
    conn: &mut SqliteConnection,
    owner_id: &str,
    installment_id: &str,
) -> Result<Option<InstallmentDB>> {
    Ok(installments::table
        .inner_join(committees::table)
        .filter(installments::id.eq(installment_id))
        .filter(committees::created_by.eq(owner_id))
        .select(InstallmentDB::as_select())
        .first::<InstallmentDB>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

fn installment_not_found(installment_id: &str) -> Error {
    Error::not_found(format!("Installment {} not found", installment_id))
}

fn owned_installments<'a>(
    owner_id: &'a str,
    committee_id: &'a str,
    contribution: Option<i64>,
) -> installments::BoxedQuery<'a, Sqlite> {
    let mut query = installments::table
        .filter(installments::committee_id.eq(committee_id))
        .filter(installments::created_by.eq(owner_id))
        .into_boxed();
    if let Some(amount) = contribution {
        query = query.filter(installments::monthly_contribution.eq(amount));
    }
    query
}

fn payment_rows<'a>(
    owner_id: &'a str,
    installment_id: &'a str,
    pattern: Option<&'a str>,
) -> diesel::dsl::IntoBoxed<'a, PaymentsWithMembers, Sqlite> {
    let mut query = installment_payments::table
        .inner_join(users::table)
        .filter(installment_payments::installment_id.eq(installment_id))
        .filter(installment_payments::created_by.eq(owner_id))
        .into_boxed();
    if let Some(pattern) = pattern {
        query = query.filter(
            users::first_name
                .like(pattern)
                .escape('\\')
                .or(users::last_name.like(pattern).escape('\\')),
        );
    }
    query
}

fn bidder_profiles(
    conn: &mut SqliteConnection,
    bidder_ids: &[String],
) -> Result<HashMap<String, MemberSummary>> {
    let mut profiles = HashMap::new();
    for chunk in chunk_for_sqlite(bidder_ids) {
        let rows = users::table
            .filter(users::id.eq_any(chunk))
            .select(UserDB::as_select())
            .load::<UserDB>(conn)
            .map_err(StorageError::from)?;
        for row in rows {
            profiles.insert(row.id.clone(), MemberSummary::from(row));
        }
    }
    Ok(profiles)
}

fn new_payment_rows(
    installment: &InstallmentDB,
    member_ids: Vec<String>,
) -> Vec<InstallmentPaymentDB> {
    member_ids
        .into_iter()
        .map(|member_id| InstallmentPaymentDB {
            id: Uuid::new_v4().to_string(),
            installment_id: installment.id.clone(),
            member_id,
            amount_paid: 0,
            payment_date: None,
            status: PaymentStatus::Pending.as_str().to_string(),
            created_by: installment.created_by.clone(),
            created_at: installment.created_at,
            updated_at: installment.created_at,
        })
        .collect()
}

#[async_trait]
impl InstallmentRepositoryTrait for InstallmentRepository {
    async fn create_with_payments(
        &self,
        owner_id: &str,
        new_installment: NewInstallment,
        monthly_contribution: i64,
        member_ids: Vec<String>,
    ) -> Result<Installment> {
        let now = Utc::now().naive_utc();
        let row = InstallmentDB {
            id: Uuid::new_v4().to_string(),
            committee_id: new_installment.committee_id,
            month: new_installment.month,
            year: new_installment.year,
            monthly_contribution,
            starting_bid: decimal_to_text(new_installment.starting_bid),
            winning_bidder: new_installment.winning_bidder,
            winning_bid_amount: decimal_to_text(new_installment.winning_bid_amount),
            is_settled: false,
            settlement_date: None,
            created_by: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Installment> {
                diesel::insert_into(installments::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let payments = new_payment_rows(&row, member_ids);
                for chunk in payments.chunks(PAYMENT_INSERT_BATCH) {
                    diesel::insert_into(installment_payments::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                debug!(
                    "Installment {} stored with {} payment obligations",
                    row.id,
                    payments.len()
                );
                Installment::try_from(row)
            })
            .await
    }

    fn get_by_id(&self, owner_id: &str, installment_id: &str) -> Result<Installment> {
        let mut conn = get_connection(&self.pool)?;
        find_owned(&mut conn, owner_id, installment_id)?
            .ok_or_else(|| installment_not_found(installment_id))
            .and_then(Installment::try_from)
    }

    fn list_for_committee(
        &self,
        owner_id: &str,
        committee_id: &str,
        page: PageRequest,
        contribution: Option<i64>,
    ) -> Result<Paginated<InstallmentWithBidder>> {
        let mut conn = get_connection(&self.pool)?;

        let (rows, total, profiles) = conn.transaction::<_, StorageError, _>(|conn| {
            let total: i64 = owned_installments(owner_id, committee_id, contribution)
                .count()
                .get_result(conn)?;
            let rows = owned_installments(owner_id, committee_id, contribution)
                .select(InstallmentDB::as_select())
                .order((installments::created_at.asc(), installments::id.asc()))
                .limit(page.limit)
                .offset(page.offset())
                .load::<InstallmentDB>(conn)?;
            let bidder_ids: Vec<String> = rows.iter().map(|r| r.winning_bidder.clone()).collect();
            let profiles = bidder_profiles(conn, &bidder_ids)?;
            Ok((rows, total, profiles))
        })?;

        let data = rows
            .into_iter()
            .map(|row| {
                let winning_bidder_profile = profiles.get(&row.winning_bidder).cloned();
                Ok(InstallmentWithBidder {
                    installment: Installment::try_from(row)?,
                    winning_bidder_profile,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Paginated::new(data, total, page))
    }

    fn list_winning_bidders(&self, owner_id: &str, committee_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(installments::table
            .inner_join(committees::table)
            .filter(installments::committee_id.eq(committee_id))
            .filter(committees::created_by.eq(owner_id))
            .select(installments::winning_bidder)
            .distinct()
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn delete_with_payments(&self, owner_id: &str, installment_id: &str) -> Result<usize> {
        let owner_id = owner_id.to_string();
        let installment_id = installment_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                if find_owned(conn, &owner_id, &installment_id)?.is_none() {
                    return Ok(0);
                }
                let payments = diesel::delete(
                    installment_payments::table
                        .filter(installment_payments::installment_id.eq(&installment_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                let deleted = diesel::delete(installments::table.find(&installment_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "Deleted installment {} with {} payments",
                    installment_id, payments
                );
                Ok(deleted)
            })
            .await
    }

    fn list_payments(
        &self,
        owner_id: &str,
        installment_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<InstallmentPaymentsPage> {
        let pattern = search.map(like_pattern);
        let pattern = pattern.as_deref();
        let mut conn = get_connection(&self.pool)?;

        let (rows, total, paid) = conn.transaction::<_, StorageError, _>(|conn| {
            let total: i64 = payment_rows(owner_id, installment_id, pattern)
                .count()
                .get_result(conn)?;
            let paid: i64 = payment_rows(owner_id, installment_id, pattern)
                .filter(installment_payments::payment_date.is_not_null())
                .count()
                .get_result(conn)?;
            let rows = payment_rows(owner_id, installment_id, pattern)
                .select((InstallmentPaymentDB::as_select(), UserDB::as_select()))
                .order((
                    users::first_name.asc(),
                    users::last_name.asc(),
                    installment_payments::id.asc(),
                ))
                .limit(page.limit)
                .offset(page.offset())
                .load::<(InstallmentPaymentDB, UserDB)>(conn)?;
            Ok((rows, total, paid))
        })?;

        let data = rows
            .into_iter()
            .map(|(payment, member)| {
                Ok(PaymentWithMember {
                    payment: InstallmentPayment::try_from(payment)?,
                    member: MemberSummary::from(member),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InstallmentPaymentsPage {
            data,
            total,
            page: page.page,
            limit: page.limit,
            paid,
        })
    }

    fn get_payment_details(&self, owner_id: &str, payment_id: &str) -> Result<PaymentDetails> {
        let mut conn = get_connection(&self.pool)?;

        let (payment, member, installment) = conn.transaction::<_, StorageError, _>(|conn| {
            let payment = installment_payments::table
                .filter(installment_payments::id.eq(payment_id))
                .filter(installment_payments::created_by.eq(owner_id))
                .select(InstallmentPaymentDB::as_select())
                .first::<InstallmentPaymentDB>(conn)?;
            let member = users::table
                .find(&payment.member_id)
                .select(UserDB::as_select())
                .first::<UserDB>(conn)?;
            let installment = installments::table
                .find(&payment.installment_id)
                .select(InstallmentDB::as_select())
                .first::<InstallmentDB>(conn)?;
            Ok((payment, member, installment))
        })?;

        Ok(PaymentDetails {
            payment: InstallmentPayment::try_from(payment)?,
            member: Member::try_from(member)?,
            installment: Installment::try_from(installment)?,
        })
    }

    async fn mark_payment(
        &self,
        owner_id: &str,
        lookup: PaymentLookup,
        is_paid: bool,
        now: NaiveDateTime,
    ) -> Result<InstallmentPayment> {
        let owner_id = owner_id.to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InstallmentPayment> {
                let mut query: installment_payments::BoxedQuery<'_, Sqlite> =
                    installment_payments::table
                        .filter(installment_payments::created_by.eq(owner_id))
                        .into_boxed();
                query = match lookup {
                    PaymentLookup::ById(payment_id) => {
                        query.filter(installment_payments::id.eq(payment_id))
                    }
                    PaymentLookup::ByMember {
                        installment_id,
                        member_id,
                    } => query
                        .filter(installment_payments::installment_id.eq(installment_id))
                        .filter(installment_payments::member_id.eq(member_id)),
                };
                let row = query
                    .select(InstallmentPaymentDB::as_select())
                    .first::<InstallmentPaymentDB>(conn)
                    .map_err(StorageError::from)?;
                let contribution = installments::table
                    .find(&row.installment_id)
                    .select(installments::monthly_contribution)
                    .first::<i64>(conn)
                    .map_err(StorageError::from)?;

                let mut payment = InstallmentPayment::try_from(row)?;
                let Some(transition) =
                    resolve_payment_transition(&payment, contribution, is_paid, now)
                else {
                    return Ok(payment);
                };

                diesel::update(installment_payments::table.find(&payment.id))
                    .set((
                        installment_payments::status.eq(transition.status.as_str()),
                        installment_payments::amount_paid.eq(transition.amount_paid),
                        installment_payments::payment_date.eq(transition.payment_date),
                        installment_payments::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                transition.apply_to(&mut payment);
                payment.updated_at = now;
                Ok(payment)
            })
            .await
    }
}
