use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use commipay_core::PageRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Envelope wrapped around every response body.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::CREATED, message, Some(data))
    }

    fn success(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            status_code: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload; `data` serializes as `null`.
    pub fn empty(message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, message, None)
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// `Json` extractor whose rejections use the failure envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string accepted by every list endpoint.
///
/// Page and limit arrive as raw strings so that malformed values fall back
/// to defaults instead of rejecting the request.
#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self, default_limit: i64) -> PageRequest {
        let parse = |value: &Option<String>| value.as_deref().and_then(|v| v.trim().parse().ok());
        PageRequest::from_optional(parse(&self.page), parse(&self.limit), default_limit)
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaymentRequest {
    pub is_paid: bool,
}
