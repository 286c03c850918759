//! Database models for installments and payments.

use chrono::NaiveDateTime;
use commipay_core::installments::{Installment, InstallmentPayment};
use commipay_core::Result;
use diesel::prelude::*;

use crate::utils::text_to_decimal;

/// Database model for the `installments` table.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::installments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstallmentDB {
    pub id: String,
    pub committee_id: String,
    pub month: i32,
    pub year: i32,
    pub monthly_contribution: i64,
    pub starting_bid: String,
    pub winning_bidder: String,
    pub winning_bid_amount: String,
    pub is_settled: bool,
    pub settlement_date: Option<NaiveDateTime>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<InstallmentDB> for Installment {
    type Error = commipay_core::Error;

    fn try_from(db: InstallmentDB) -> Result<Self> {
        Ok(Self {
            starting_bid: text_to_decimal(&db.starting_bid, "installments.starting_bid")?,
            winning_bid_amount: text_to_decimal(
                &db.winning_bid_amount,
                "installments.winning_bid_amount",
            )?,
            id: db.id,
            committee_id: db.committee_id,
            month: db.month,
            year: db.year,
            monthly_contribution: db.monthly_contribution,
            winning_bidder: db.winning_bidder,
            is_settled: db.is_settled,
            settlement_date: db.settlement_date,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

/// Database model for the `installment_payments` table.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::installment_payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstallmentPaymentDB {
    pub id: String,
    pub installment_id: String,
    pub member_id: String,
    pub amount_paid: i64,
    pub payment_date: Option<NaiveDateTime>,
    pub status: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<InstallmentPaymentDB> for InstallmentPayment {
    type Error = commipay_core::Error;

    fn try_from(db: InstallmentPaymentDB) -> Result<Self> {
        Ok(Self {
            status: db.status.parse()?,
            id: db.id,
            installment_id: db.installment_id,
            member_id: db.member_id,
            amount_paid: db.amount_paid,
            payment_date: db.payment_date,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
