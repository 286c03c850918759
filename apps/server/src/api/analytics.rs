use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Router,
};
use commipay_core::analytics::{DashboardStats, PendingMember, PendingPaymentsReport};
use commipay_core::constants::DEFAULT_MEMBER_PAGE_LIMIT;
use commipay_core::{Owner, Paginated};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ApiResponse, ListQuery},
};

/// Served under both pending-report paths.
async fn get_pending_payments_report(
    Path(member_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<PendingPaymentsReport>> {
    let report = state
        .analytics_service
        .get_pending_payments_report(&owner.id, &member_id)?;
    Ok(ApiResponse::ok(
        "Pending payment records fetched successfully",
        report,
    ))
}

async fn get_dashboard_stats(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<DashboardStats>> {
    let stats = state.analytics_service.get_dashboard_stats(&owner.id).await?;
    Ok(ApiResponse::ok("Dashboard stats fetched successfully", stats))
}

async fn get_pending_members(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiResponse<Paginated<PendingMember>>> {
    let page = query.page_request(DEFAULT_MEMBER_PAGE_LIMIT);
    let members = state
        .analytics_service
        .get_pending_members(&owner.id, page, query.search())?;
    Ok(ApiResponse::ok(
        "Pending members fetched successfully",
        members,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/analytics/payments-records/{member_id}",
            get(get_pending_payments_report),
        )
        .route(
            "/analytics/members/{member_id}/pending-payments",
            get(get_pending_payments_report),
        )
        .route("/analytics/dashboard", get(get_dashboard_stats))
        .route("/analytics/pending-members", get(get_pending_members))
}
