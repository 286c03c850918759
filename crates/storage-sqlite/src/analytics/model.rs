//! Row shapes returned by the aggregation queries.

use commipay_core::analytics::{
    PendingCommitteeRef, PendingInstallmentRef, PendingMember, PendingPaymentAggregate,
    PendingPaymentGroup, PendingSummary,
};
use commipay_core::Result;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};

use crate::utils::text_to_decimal;

#[derive(QueryableByName, Debug)]
pub struct PendingGroupRow {
    #[diesel(sql_type = Text)]
    pub committee_id: String,
    #[diesel(sql_type = Text)]
    pub committee_amount: String,
    #[diesel(sql_type = Integer)]
    pub monthly_due_day: i32,
    #[diesel(sql_type = Text)]
    pub installment_id: String,
    #[diesel(sql_type = Text)]
    pub starting_bid: String,
    #[diesel(sql_type = Text)]
    pub winning_bid_amount: String,
    #[diesel(sql_type = BigInt)]
    pub monthly_contribution: i64,
    #[diesel(sql_type = BigInt)]
    pub pending_count: i64,
    #[diesel(sql_type = BigInt)]
    pub total_pending_amount: i64,
}

impl TryFrom<PendingGroupRow> for PendingPaymentGroup {
    type Error = commipay_core::Error;

    fn try_from(row: PendingGroupRow) -> Result<Self> {
        Ok(PendingPaymentGroup {
            committee: PendingCommitteeRef {
                amount: text_to_decimal(&row.committee_amount, "committees.amount")?,
                id: row.committee_id,
                monthly_due_day: row.monthly_due_day,
            },
            installment: PendingInstallmentRef {
                starting_bid: text_to_decimal(&row.starting_bid, "installments.starting_bid")?,
                winning_bid_amount: text_to_decimal(
                    &row.winning_bid_amount,
                    "installments.winning_bid_amount",
                )?,
                id: row.installment_id,
            },
            payment: PendingPaymentAggregate {
                monthly_contribution: row.monthly_contribution,
                count: row.pending_count,
                total_pending_amount: row.total_pending_amount,
            },
        })
    }
}

#[derive(QueryableByName, Debug)]
pub struct PendingSummaryRow {
    #[diesel(sql_type = BigInt)]
    pub total_pending_amount: i64,
    #[diesel(sql_type = BigInt)]
    pub total_pending_count: i64,
}

impl From<PendingSummaryRow> for PendingSummary {
    fn from(row: PendingSummaryRow) -> Self {
        PendingSummary {
            total_pending_amount: row.total_pending_amount,
            total_pending_count: row.total_pending_count,
        }
    }
}

#[derive(QueryableByName, Debug)]
pub struct PendingMemberRow {
    #[diesel(sql_type = Text)]
    pub id: String,
    #[diesel(sql_type = Text)]
    pub first_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub last_name: Option<String>,
    #[diesel(sql_type = Text)]
    pub country_code: String,
    #[diesel(sql_type = Text)]
    pub phone_number: String,
    #[diesel(sql_type = BigInt)]
    pub total_pending_amount: i64,
    #[diesel(sql_type = BigInt)]
    pub pending_count: i64,
}

impl From<PendingMemberRow> for PendingMember {
    fn from(row: PendingMemberRow) -> Self {
        PendingMember {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            country_code: row.country_code,
            phone_number: row.phone_number,
            total_pending_amount: row.total_pending_amount,
            pending_count: row.pending_count,
        }
    }
}

#[derive(QueryableByName, Debug)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}
