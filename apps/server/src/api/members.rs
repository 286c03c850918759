use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Router,
};
use commipay_core::constants::DEFAULT_MEMBER_PAGE_LIMIT;
use commipay_core::members::{Member, MemberUpdate, NewMember};
use commipay_core::{Owner, Paginated};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ApiResponse, AppJson, ListQuery},
};

async fn create_member(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<NewMember>,
) -> ApiResult<ApiResponse<Member>> {
    let member = state.member_service.create_member(&owner.id, payload).await?;
    Ok(ApiResponse::created("User created successfully", member))
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiResponse<Paginated<Member>>> {
    let page = query.page_request(DEFAULT_MEMBER_PAGE_LIMIT);
    let members = state
        .member_service
        .list_members(&owner.id, page, query.search())?;
    Ok(ApiResponse::ok("List of users retrieved", members))
}

async fn get_member(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<Member>> {
    let member = state.member_service.get_member(&owner.id, &id)?;
    Ok(ApiResponse::ok("User retrieved successfully", member))
}

async fn update_member(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<MemberUpdate>,
) -> ApiResult<ApiResponse<Member>> {
    let member = state
        .member_service
        .update_member(&owner.id, &id, payload)
        .await?;
    Ok(ApiResponse::ok("User updated successfully", member))
}

async fn delete_member(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<()>> {
    state.member_service.delete_member(&owner.id, &id).await?;
    Ok(ApiResponse::empty("User deleted successfully"))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_members).post(create_member))
        .route(
            "/users/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
}
