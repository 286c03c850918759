use async_trait::async_trait;

use super::analytics_model::{DashboardStats, PendingMember, PendingPaymentsReport};
use crate::errors::Result;
use crate::utils::pagination::{PageRequest, Paginated};

/// Read-only aggregation queries over the ledger.
///
/// Each call must be answered from a single consistent snapshot.
pub trait AnalyticsRepositoryTrait: Send + Sync {
    /// Groups the member's PENDING obligations by (committee, installment).
    /// The summary is computed over all matched rows, not from the groups.
    fn pending_payments_report(
        &self,
        owner_id: &str,
        member_id: &str,
    ) -> Result<PendingPaymentsReport>;

    fn count_committees(&self, owner_id: &str) -> Result<i64>;

    fn count_members(&self, owner_id: &str) -> Result<i64>;

    fn count_members_with_pending(&self, owner_id: &str) -> Result<i64>;

    /// Members with a positive pending balance, ordered by first then last
    /// name. `search` matches first name, last name or phone with whitespace
    /// stripped, case-insensitively.
    fn list_pending_members(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<PendingMember>>;
}

#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    fn get_pending_payments_report(
        &self,
        owner_id: &str,
        member_id: &str,
    ) -> Result<PendingPaymentsReport>;

    /// The three counters are computed concurrently.
    async fn get_dashboard_stats(&self, owner_id: &str) -> Result<DashboardStats>;

    fn get_pending_members(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<PendingMember>>;
}
