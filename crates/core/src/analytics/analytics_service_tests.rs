use crate::analytics::{
    AnalyticsRepositoryTrait, AnalyticsService, AnalyticsServiceTrait, DashboardStats,
    PendingMember, PendingPaymentsReport,
};
use crate::errors::{Error, Result};
use crate::utils::pagination::{PageRequest, Paginated};
use std::sync::{Arc, Mutex};

// --- Mock AnalyticsRepository ---
#[derive(Default)]
struct MockAnalyticsRepository {
    fail_members: bool,
    searches: Mutex<Vec<Option<String>>>,
}

impl AnalyticsRepositoryTrait for MockAnalyticsRepository {
    fn pending_payments_report(
        &self,
        _owner_id: &str,
        _member_id: &str,
    ) -> Result<PendingPaymentsReport> {
        Ok(PendingPaymentsReport::default())
    }

    fn count_committees(&self, owner_id: &str) -> Result<i64> {
        Ok(if owner_id == "owner-1" { 3 } else { 0 })
    }

    fn count_members(&self, owner_id: &str) -> Result<i64> {
        if self.fail_members {
            return Err(Error::Unexpected("boom".to_string()));
        }
        Ok(if owner_id == "owner-1" { 12 } else { 0 })
    }

    fn count_members_with_pending(&self, owner_id: &str) -> Result<i64> {
        Ok(if owner_id == "owner-1" { 5 } else { 0 })
    }

    fn list_pending_members(
        &self,
        _owner_id: &str,
        page: PageRequest,
        search: Option<&str>,
    ) -> Result<Paginated<PendingMember>> {
        self.searches
            .lock()
            .unwrap()
            .push(search.map(str::to_string));
        Ok(Paginated::new(Vec::new(), 0, page))
    }
}

#[tokio::test]
async fn test_dashboard_stats_combines_counters() {
    let service = AnalyticsService::new(Arc::new(MockAnalyticsRepository::default()));
    let stats = service.get_dashboard_stats("owner-1").await.unwrap();
    assert_eq!(
        stats,
        DashboardStats {
            total_committees: 3,
            total_members: 12,
            pending_members: 5,
        }
    );

    let empty = service.get_dashboard_stats("owner-2").await.unwrap();
    assert_eq!(empty, DashboardStats::default());
}

#[tokio::test]
async fn test_dashboard_stats_propagates_counter_failure() {
    let repo = MockAnalyticsRepository {
        fail_members: true,
        ..Default::default()
    };
    let service = AnalyticsService::new(Arc::new(repo));
    let err = service.get_dashboard_stats("owner-1").await.unwrap_err();
    assert!(matches!(err, Error::Unexpected(_)));
}

#[test]
fn test_pending_members_search_is_normalized() {
    let repo = Arc::new(MockAnalyticsRepository::default());
    let service = AnalyticsService::new(repo.clone());
    let page = PageRequest::new(1, 20);

    service.get_pending_members("owner-1", page, Some("  ")).unwrap();
    service.get_pending_members("owner-1", page, Some(" ali ")).unwrap();

    let searches = repo.searches.lock().unwrap();
    assert_eq!(*searches, vec![None, Some("ali".to_string())]);
}

#[test]
fn test_empty_report_has_zero_summary() {
    let service = AnalyticsService::new(Arc::new(MockAnalyticsRepository::default()));
    let report = service.get_pending_payments_report("owner-1", "m-1").unwrap();
    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_pending_amount, 0);
    assert_eq!(report.summary.total_pending_count, 0);
}
