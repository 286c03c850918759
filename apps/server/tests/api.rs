use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use commipay_core::Role;
use commipay_server::{
    api::app_router,
    auth::Claims,
    build_state,
    config::{Config, LogFormat},
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        jwt_secret: SECRET.to_vec(),
        log_format: LogFormat::Text,
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

fn token_for(owner_id: &str) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize;
    let claims = Claims {
        id: owner_id.to_string(),
        role: Role::Admin,
        email: Some(format!("{owner_id}@example.com")),
        exp: now + 3600,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_member(app: &Router, token: &str, first_name: &str, phone: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/users",
        Some(token),
        Some(json!({
            "firstName": first_name,
            "lastName": "Khan",
            "countryCode": "+92",
            "phoneNumber": phone,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_committee(app: &Router, token: &str, members: &[String]) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/committee",
        Some(token),
        Some(json!({
            "amount": 1000,
            "bid": 100,
            "startDate": "2025-09-01",
            "monthlyDueDay": 5,
            "members": members,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Committee created successfully");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn healthz_is_public() {
    let (app, _tmp) = build_test_router().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (app, _tmp) = build_test_router().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/committee", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 401);
    assert!(body["data"].is_null());

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/committee",
        Some("garbage"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/committee",
        Some(&token_for("owner-1")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["limit"], 10);
}

#[tokio::test]
async fn malformed_body_uses_failure_envelope() {
    let (app, _tmp) = build_test_router().await;
    let token = token_for("owner-1");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/installment",
        Some(&token),
        Some(json!({ "month": "September" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn installment_lifecycle() {
    let (app, _tmp) = build_test_router().await;
    let token = token_for("owner-1");
    let mut members = Vec::new();
    for (name, phone) in [
        ("Zara", "3000000001"),
        ("Bilal", "3000000002"),
        ("Ahmed", "3000000003"),
        ("Bushra", "3000000004"),
    ] {
        members.push(create_member(&app, &token, name, phone).await);
    }
    let committee_id = create_committee(&app, &token, &members).await;

    let installment_body = json!({
        "committee": committee_id,
        "month": 9,
        "year": 2025,
        "winningBidder": members[1],
        "winningBidAmount": 850,
        "startingBid": 150,
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/installment",
        Some(&token),
        Some(installment_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["monthlyContribution"], 38);
    let installment_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/installment",
        Some(&token),
        Some(installment_body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let payments_uri = format!("/api/v1/installment/{installment_id}/payments");
    let (status, body) = send(&app, Method::GET, &payments_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["paid"], 0);

    let mark_uri = format!("/api/v1/installment/{installment_id}/payment/{}", members[0]);
    let (status, body) = send(
        &app,
        Method::PATCH,
        &mark_uri,
        Some(&token),
        Some(json!({ "isPaid": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Payment status updated successfully");
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["amountPaid"], 38);
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    let by_id_uri = format!("/api/v1/installment/payments/{payment_id}");
    let (status, body) = send(
        &app,
        Method::PATCH,
        &by_id_uri,
        Some(&token),
        Some(json!({ "isPaid": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["amountPaid"], 38);
    assert!(body["data"]["paymentDate"].is_string());

    let (status, body) = send(&app, Method::GET, &by_id_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["member"]["firstName"], "Zara");

    let report_uri = format!("/api/v1/analytics/payments-records/{}", members[2]);
    let (status, body) = send(&app, Method::GET, &report_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"]["totalPendingAmount"], 38);
    assert_eq!(body["data"]["summary"]["totalPendingCount"], 1);
    let variant_uri = format!("/api/v1/analytics/members/{}/pending-payments", members[2]);
    let (_, variant) = send(&app, Method::GET, &variant_uri, Some(&token), None).await;
    assert_eq!(variant["data"], body["data"]);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/analytics/dashboard",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCommittees"], 1);
    assert_eq!(body["data"]["totalMembers"], 4);
    assert_eq!(body["data"]["pendingMembers"], 3);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/analytics/pending-members?search=bu",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["limit"], 20);
    assert_eq!(body["data"]["data"][0]["firstName"], "Bushra");

    let available_uri = format!("/api/v1/installment/{committee_id}/available-members");
    let (status, body) = send(&app, Method::GET, &available_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let other = token_for("owner-2");
    let delete_uri = format!("/api/v1/installment/{installment_id}");
    let (status, body) = send(&app, Method::DELETE, &delete_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Installment not found or access denied");

    let (status, body) = send(&app, Method::DELETE, &delete_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, _) = send(&app, Method::GET, &payments_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn committees_are_owner_scoped() {
    let (app, _tmp) = build_test_router().await;
    let token = token_for("owner-1");
    let member = create_member(&app, &token, "Zara", "3000000001").await;
    let committee_id = create_committee(&app, &token, &[member]).await;
    let uri = format!("/api/v1/committee/{committee_id}");

    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["members"][0]["firstName"], "Zara");

    let other = token_for("owner-2");
    let (status, _) = send(&app, Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "monthlyDueDay": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["monthlyDueDay"], 12);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
