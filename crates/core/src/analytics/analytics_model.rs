//! Reporting models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Committee fields carried on a pending-report group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingCommitteeRef {
    pub id: String,
    pub amount: Decimal,
    pub monthly_due_day: i32,
}

/// Installment fields carried on a pending-report group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingInstallmentRef {
    pub id: String,
    pub starting_bid: Decimal,
    pub winning_bid_amount: Decimal,
}

/// Aggregated pending obligations of one group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentAggregate {
    pub monthly_contribution: i64,
    pub count: i64,
    pub total_pending_amount: i64,
}

/// Pending obligations of a member for one (committee, installment) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentGroup {
    pub committee: PendingCommitteeRef,
    pub installment: PendingInstallmentRef,
    pub payment: PendingPaymentAggregate,
}

/// Grand totals over every matched obligation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub total_pending_amount: i64,
    pub total_pending_count: i64,
}

/// Pending-payments report for one member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentsReport {
    pub groups: Vec<PendingPaymentGroup>,
    pub summary: PendingSummary,
}

/// Owner-level dashboard counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_committees: i64,
    pub total_members: i64,
    /// Distinct members with at least one PENDING obligation.
    pub pending_members: i64,
}

/// A member with an outstanding balance across all installments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingMember {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub country_code: String,
    pub phone_number: String,
    pub total_pending_amount: i64,
    pub pending_count: i64,
}
