//! Analytics module - pending balances, dashboard counters and member lists.

mod analytics_model;
mod analytics_service;
mod analytics_traits;

#[cfg(test)]
mod analytics_service_tests;

pub use analytics_model::{
    DashboardStats, PendingCommitteeRef, PendingInstallmentRef, PendingMember,
    PendingPaymentAggregate, PendingPaymentGroup, PendingPaymentsReport, PendingSummary,
};
pub use analytics_service::AnalyticsService;
pub use analytics_traits::{AnalyticsRepositoryTrait, AnalyticsServiceTrait};
