use log::debug;
use std::sync::Arc;
use tokio::task::JoinError;

use super::analytics_model::{DashboardStats, PendingMember, PendingPaymentsReport};
use super::analytics_traits::{AnalyticsRepositoryTrait, AnalyticsServiceTrait};
use crate::errors::{Error, Result};
use crate::utils::pagination::{normalize_search, PageRequest, Paginated};

/// Read-only reporting over the ledger.
pub struct AnalyticsService {
    repository: Arc<dyn AnalyticsRepositoryTrait>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn AnalyticsRepositoryTrait>) -> Self {
        Self { repository }
    }

    async fn count<F>(&self, owner_id: &str, query: F) -> Result<i64>
    where
        F: FnOnce(&dyn AnalyticsRepositoryTrait, &str) -> Result<i64> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        let owner_id = owner_id.to_string();
        tokio::task::spawn_blocking(move || query(repository.as_ref(), &owner_id))
            .await
            .map_err(join_failed)?
    }
}

fn join_failed(err: JoinError) -> Error {
    Error::Unexpected(format!("Counting task failed: {}", err))
}

#[async_trait::async_trait]
impl AnalyticsServiceTrait for AnalyticsService {
    fn get_pending_payments_report(
        &self,
        owner_id: &str,
        member_id: &str,
    ) -> Result<PendingPaymentsReport> {
        debug!("Building pending report of member {} for owner {}", member_id, owner_id);
        self.repository.pending_payments_report(owner_id, member_id)
    }

    async fn get_dashboard_stats(&self, owner_id: &str) -> Result<DashboardStats> {
        let (total_committees, total_members, pending_members) = tokio::try_join!(
            self.count(owner_id, |repo, owner| repo.count_committees(owner)),
            self.count(owner_id, |repo, owner| repo.count_members(owner)),
            self.count(owner_id, |repo, owner| repo.count_members_with_pending(owner)),
        )?;
        Ok(DashboardStats {
            total_committees,
            total_members,
            pending_members,
        })
    }

    fn get_pending_members(
        &self,
        owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<PendingMember>> {
        let search = normalize_search(search);
        self.repository
            .list_pending_members(owner_id, page, search.as_deref())
    }
}
