use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Router,
};
use commipay_core::committees::{Committee, CommitteeDetails, CommitteeUpdate, NewCommittee};
use commipay_core::constants::DEFAULT_PAGE_LIMIT;
use commipay_core::{Owner, Paginated};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ApiResponse, AppJson, ListQuery},
};

async fn create_committee(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<NewCommittee>,
) -> ApiResult<ApiResponse<Committee>> {
    let committee = state
        .committee_service
        .create_committee(&owner.id, payload)
        .await?;
    Ok(ApiResponse::created("Committee created successfully", committee))
}

async fn list_committees(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiResponse<Paginated<Committee>>> {
    let page = query.page_request(DEFAULT_PAGE_LIMIT);
    let committees = state
        .committee_service
        .list_committees(&owner.id, page, query.search())?;
    Ok(ApiResponse::ok("Committees fetched successfully", committees))
}

async fn get_committee(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<CommitteeDetails>> {
    let committee = state.committee_service.get_committee(&owner.id, &id)?;
    Ok(ApiResponse::ok("Committee fetched successfully", committee))
}

async fn update_committee(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<CommitteeUpdate>,
) -> ApiResult<ApiResponse<CommitteeDetails>> {
    let committee = state
        .committee_service
        .update_committee(&owner.id, &id, payload)
        .await?;
    Ok(ApiResponse::ok("Committee updated successfully", committee))
}

async fn delete_committee(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<()>> {
    state.committee_service.delete_committee(&owner.id, &id).await?;
    Ok(ApiResponse::empty("Committee deleted successfully"))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/committee", get(list_committees).post(create_committee))
        .route(
            "/committee/{id}",
            get(get_committee)
                .patch(update_committee)
                .delete(delete_committee),
        )
}
