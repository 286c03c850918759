use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Extension, Router,
};
use commipay_core::constants::DEFAULT_PAGE_LIMIT;
use commipay_core::installments::{
    Installment, InstallmentPayment, InstallmentPaymentsPage, InstallmentWithBidder,
    NewInstallment, PaymentDetails,
};
use commipay_core::members::MemberSummary;
use commipay_core::{Owner, Paginated};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ApiResponse, AppJson, ListQuery, MarkPaymentRequest},
};

async fn create_installment(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<NewInstallment>,
) -> ApiResult<ApiResponse<Installment>> {
    let installment = state
        .installment_service
        .create_installment(&owner.id, payload)
        .await?;
    Ok(ApiResponse::created(
        "Installment created successfully",
        installment,
    ))
}

async fn mark_payment(
    Path((installment_id, member_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<MarkPaymentRequest>,
) -> ApiResult<ApiResponse<InstallmentPayment>> {
    let payment = state
        .installment_service
        .mark_payment(&owner.id, &installment_id, &member_id, payload.is_paid)
        .await?;
    Ok(ApiResponse::ok("Payment status updated successfully", payment))
}

async fn mark_payment_by_id(
    Path(payment_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    AppJson(payload): AppJson<MarkPaymentRequest>,
) -> ApiResult<ApiResponse<InstallmentPayment>> {
    let payment = state
        .installment_service
        .mark_payment_by_id(&owner.id, &payment_id, payload.is_paid)
        .await?;
    Ok(ApiResponse::ok("Payment status updated successfully", payment))
}

async fn delete_installment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<()>> {
    state
        .installment_service
        .delete_installment(&owner.id, &id)
        .await?;
    Ok(ApiResponse::empty(
        "Installment and payment records deleted successfully",
    ))
}

/// `id` names the committee whose installments are listed.
async fn get_installments(
    Path(committee_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiResponse<Paginated<InstallmentWithBidder>>> {
    let page = query.page_request(DEFAULT_PAGE_LIMIT);
    let installments = state.installment_service.get_installments(
        &owner.id,
        &committee_id,
        page,
        query.search(),
    )?;
    Ok(ApiResponse::ok("Installments fetched successfully", installments))
}

async fn get_payments_for_installment(
    Path(installment_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ApiResponse<InstallmentPaymentsPage>> {
    let page = query.page_request(DEFAULT_PAGE_LIMIT);
    let payments = state.installment_service.get_payments_for_installment(
        &owner.id,
        &installment_id,
        page,
        query.search(),
    )?;
    Ok(ApiResponse::ok("Payment records fetched successfully", payments))
}

/// `id` names the committee.
async fn get_available_members(
    Path(committee_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<Vec<MemberSummary>>> {
    let members = state
        .installment_service
        .get_available_members(&owner.id, &committee_id)?;
    Ok(ApiResponse::ok("Available members fetched successfully", members))
}

async fn get_payment_details(
    Path(payment_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> ApiResult<ApiResponse<PaymentDetails>> {
    let payment = state
        .installment_service
        .get_payment_details(&owner.id, &payment_id)?;
    Ok(ApiResponse::ok("Payment record fetched successfully", payment))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/installment", post(create_installment))
        .route(
            "/installment/payments/{payment_id}",
            get(get_payment_details).patch(mark_payment_by_id),
        )
        .route(
            "/installment/{id}",
            get(get_installments).delete(delete_installment),
        )
        .route(
            "/installment/{id}/payments",
            get(get_payments_for_installment),
        )
        .route(
            "/installment/{id}/available-members",
            get(get_available_members),
        )
        .route(
            "/installment/{id}/payment/{member_id}",
            patch(mark_payment),
        )
}
