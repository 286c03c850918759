//! Installment and payment obligation domain models.

use chrono::{NaiveDateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_INSTALLMENT_YEAR, MIN_INSTALLMENT_YEAR};
use crate::errors::{Error, Result};
use crate::members::{Member, MemberSummary};

/// Status of a single payment obligation.
///
/// The only transitions are `Pending <-> Completed`, driven by mark-payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            other => Err(Error::invalid_input(format!(
                "Unknown payment status '{}'",
                other
            ))),
        }
    }
}

/// One month's bidding/contribution cycle of a committee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: String,
    pub committee_id: String,
    pub month: i32,
    pub year: i32,
    /// Fixed at creation; never recomputed.
    pub monthly_contribution: i64,
    pub starting_bid: Decimal,
    pub winning_bidder: String,
    pub winning_bid_amount: Decimal,
    pub is_settled: bool,
    pub settlement_date: Option<NaiveDateTime>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Installment list row with the winning bidder's profile joined in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentWithBidder {
    #[serde(flatten)]
    pub installment: Installment,
    pub winning_bidder_profile: Option<MemberSummary>,
}

/// Input model for creating an installment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstallment {
    #[serde(alias = "committee")]
    pub committee_id: String,
    pub month: i32,
    pub year: i32,
    pub winning_bidder: String,
    pub winning_bid_amount: Decimal,
    pub starting_bid: Decimal,
}

impl NewInstallment {
    pub fn validate(&self) -> Result<()> {
        if self.committee_id.trim().is_empty() {
            return Err(Error::invalid_input("committee is required"));
        }
        if self.winning_bidder.trim().is_empty() {
            return Err(Error::invalid_input("winningBidder is required"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(Error::invalid_input("month must be between 1 and 12"));
        }
        if !(MIN_INSTALLMENT_YEAR..=MAX_INSTALLMENT_YEAR).contains(&self.year) {
            return Err(Error::invalid_input(format!(
                "year must be between {} and {}",
                MIN_INSTALLMENT_YEAR, MAX_INSTALLMENT_YEAR
            )));
        }
        if self.winning_bid_amount.is_sign_negative() {
            return Err(Error::invalid_input("winningBidAmount must not be negative"));
        }
        if self.starting_bid.is_sign_negative() {
            return Err(Error::invalid_input("startingBid must not be negative"));
        }
        Ok(())
    }
}

/// A single member's obligation for one installment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPayment {
    pub id: String,
    pub installment_id: String,
    pub member_id: String,
    /// Either 0 (pending) or exactly the installment's contribution.
    pub amount_paid: i64,
    pub payment_date: Option<NaiveDateTime>,
    pub status: PaymentStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payment row with the member's name fields joined in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithMember {
    #[serde(flatten)]
    pub payment: InstallmentPayment,
    pub member: MemberSummary,
}

/// Payment with both sides of the relation resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(flatten)]
    pub payment: InstallmentPayment,
    pub member: Member,
    pub installment: Installment,
}

/// Page of payments for one installment plus the number already paid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPaymentsPage {
    pub data: Vec<PaymentWithMember>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    /// Matching rows with a non-null payment date.
    pub paid: i64,
}

/// The two ways a caller can address a payment obligation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentLookup {
    ById(String),
    ByMember {
        installment_id: String,
        member_id: String,
    },
}

impl fmt::Display for PaymentLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentLookup::ById(id) => write!(f, "payment {}", id),
            PaymentLookup::ByMember {
                installment_id,
                member_id,
            } => write!(f, "installment {} / member {}", installment_id, member_id),
        }
    }
}

/// Target values written by a payment transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTransition {
    pub status: PaymentStatus,
    pub amount_paid: i64,
    pub payment_date: Option<NaiveDateTime>,
}

impl PaymentTransition {
    pub fn apply_to(self, payment: &mut InstallmentPayment) {
        payment.status = self.status;
        payment.amount_paid = self.amount_paid;
        payment.payment_date = self.payment_date;
    }
}

/// Computes the state a payment must move to, or `None` when it already
/// holds the requested state.
pub fn resolve_payment_transition(
    current: &InstallmentPayment,
    monthly_contribution: i64,
    is_paid: bool,
    now: NaiveDateTime,
) -> Option<PaymentTransition> {
    if is_paid {
        let already_paid = current.status == PaymentStatus::Completed
            && current.amount_paid == monthly_contribution
            && current.payment_date.is_some();
        (!already_paid).then_some(PaymentTransition {
            status: PaymentStatus::Completed,
            amount_paid: monthly_contribution,
            payment_date: Some(now),
        })
    } else {
        let already_pending = current.status == PaymentStatus::Pending
            && current.amount_paid == 0
            && current.payment_date.is_none();
        (!already_pending).then_some(PaymentTransition {
            status: PaymentStatus::Pending,
            amount_paid: 0,
            payment_date: None,
        })
    }
}

/// `ceil((pool - winning_bid) / member_count)` as an integer amount.
pub fn compute_monthly_contribution(
    pool_amount: Decimal,
    winning_bid_amount: Decimal,
    member_count: usize,
) -> Result<i64> {
    if member_count == 0 {
        return Err(Error::invalid_input("Committee has no members"));
    }
    let share = (pool_amount - winning_bid_amount) / Decimal::from(member_count);
    share
        .ceil()
        .to_i64()
        .ok_or_else(|| Error::invalid_input("Monthly contribution is out of range"))
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
