// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use pcinv_api::AuthError;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::session::SessionError;

const ADMIN_PASSWORD: &str = "Admin-Pass-1";
const STAFF_PASSWORD: &str = "Staff-Pass-1";

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence = Persistence::new_in_memory()
        .expect("Failed to create in-memory persistence")
        .with_password_cost(4);
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        config: ServerConfig::default(),
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Creates the first admin and returns a session token for it.
async fn bootstrap_admin(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bootstrap/admin",
            None,
            &json!({
                "username": "admin",
                "full_name": "Alice Admin",
                "password": ADMIN_PASSWORD,
                "password_confirmation": ADMIN_PASSWORD,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    login(app, "admin", ADMIN_PASSWORD).await
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    body["session_token"].as_str().unwrap().to_string()
}

/// Creates a staff account through the admin session and logs it in.
async fn staff_session(app: &Router, admin_token: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(admin_token),
            &json!({
                "username": "staff",
                "full_name": "Sam Staff",
                "role": "staff",
                "password": STAFF_PASSWORD,
                "password_confirmation": STAFF_PASSWORD,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    login(app, "staff", STAFF_PASSWORD).await
}

async fn create_category(app: &Router, token: &str, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/categories",
            Some(token),
            &json!({ "name": name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    body_json(response).await["category_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_bootstrap_status_reports_missing_admin() {
    let app: Router = build_router(create_test_app_state());

    let response = app
        .clone()
        .oneshot(get_request("/api/bootstrap/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["needs_bootstrap"], json!(true));

    bootstrap_admin(&app).await;

    let response = app
        .oneshot(get_request("/api/bootstrap/status", None))
        .await
        .unwrap();
    let body: Value = body_json(response).await;
    assert_eq!(body["needs_bootstrap"], json!(false));
}

#[tokio::test]
async fn test_second_bootstrap_is_conflict() {
    let app: Router = build_router(create_test_app_state());
    bootstrap_admin(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/bootstrap/admin",
            None,
            &json!({
                "username": "other",
                "full_name": "Other Admin",
                "password": ADMIN_PASSWORD,
                "password_confirmation": ADMIN_PASSWORD,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app: Router = build_router(create_test_app_state());
    bootstrap_admin(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);

    let cookie: &str = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("pcinv_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=28800"));
}

#[tokio::test]
async fn test_login_failure_is_uniform() {
    let app: Router = build_router(create_test_app_state());
    bootstrap_admin(&app).await;

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": "nope" }),
        ))
        .await
        .unwrap();
    let unknown_user = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "ghost", "password": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), HttpStatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), HttpStatusCode::UNAUTHORIZED);
    let first: Value = body_json(wrong_password).await;
    let second: Value = body_json(unknown_user).await;
    assert_eq!(first, second);
    assert!(
        first["message"]
            .as_str()
            .unwrap()
            .contains("Invalid username or password")
    );
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let response = app
        .oneshot(get_request("/api/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["message"], json!("Not logged in"));
}

#[tokio::test]
async fn test_malformed_authorization_header_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/whoami")
        .header("authorization", "Basic abc")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_store_failure_is_internal_error() {
    let rejection: SessionError = SessionError::from(AuthError::Internal {
        message: String::from("Database error: disk I/O error"),
    });
    let response: Response = rejection.into_response();

    assert_eq!(response.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert!(body["message"].as_str().unwrap().contains("disk I/O error"));
}

#[tokio::test]
async fn test_rejected_session_stays_unauthorized() {
    let rejection: SessionError = SessionError::from(AuthError::AuthenticationFailed {
        reason: String::from("Session expired"),
    });
    let response: Response = rejection.into_response();

    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_whoami_accepts_cookie() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/whoami")
        .header("cookie", format!("theme=dark; pcinv_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["user"]["username"], json!("admin"));
    assert_eq!(body["user"]["role"], json!("admin"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", Some(&token), &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let cookie: &str = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let response = app
        .oneshot(get_request("/api/auth/whoami", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_cannot_manage_users() {
    let app: Router = build_router(create_test_app_state());
    let admin_token: String = bootstrap_admin(&app).await;
    let staff_token: String = staff_session(&app, &admin_token).await;

    let response = app
        .oneshot(get_request("/api/users", Some(&staff_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_missing_hardware_is_not_found() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let response = app
        .oneshot(get_request("/api/hardware/999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_category_is_conflict() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;
    create_category(&app, &token, "Laptops").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/categories",
            Some(&token),
            &json!({ "name": "laptops" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::CONFLICT);
}

#[tokio::test]
async fn test_hardware_lifecycle_over_http() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;
    let category_id: i64 = create_category(&app, &token, "Monitors").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/hardware",
            Some(&token),
            &json!({
                "name": "P2419H",
                "category_id": category_id,
                "brand": "Dell",
                "unused": 3,
                "in_use": 2,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    let body: Value = body_json(response).await;
    let hardware_id: i64 = body["hardware"]["hardware_id"].as_i64().unwrap();
    assert_eq!(body["hardware"]["total_quantity"], json!(5));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/hardware/{hardware_id}/status"),
            Some(&token),
            &json!({ "from": "unused", "to": "repair", "quantity": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["hardware"]["unused"], json!(1));
    assert_eq!(body["hardware"]["repair"], json!(2));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/hardware/{hardware_id}"))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/hardware", Some(&token)))
        .await
        .unwrap();
    let body: Value = body_json(response).await;
    assert_eq!(body["total"], json!(0));

    let response = app
        .clone()
        .oneshot(get_request("/api/hardware?scope=deleted", Some(&token)))
        .await
        .unwrap();
    let body: Value = body_json(response).await;
    assert_eq!(body["total"], json!(1));

    let response = app
        .oneshot(get_request(
            &format!("/api/history?hardware_id={hardware_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["total"], json!(3));
}

#[tokio::test]
async fn test_overdrawn_move_is_rejected() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;
    let category_id: i64 = create_category(&app, &token, "Docks").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/hardware",
            Some(&token),
            &json!({ "name": "WD19", "category_id": category_id, "unused": 1 }),
        ))
        .await
        .unwrap();
    let hardware_id: i64 = body_json(response).await["hardware"]["hardware_id"]
        .as_i64()
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/hardware/{hardware_id}/status"),
            Some(&token),
            &json!({ "from": "unused", "to": "in_use", "quantity": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_export_is_attachment() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let response = app
        .oneshot(get_request("/api/export", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);

    let content_type: &str = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/csv"));
    let disposition: String = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"hardware_"));
    assert!(disposition.ends_with(".csv\""));

    let body: String = body_text(response).await;
    assert!(body.starts_with("name,"));
}

#[tokio::test]
async fn test_backup_requires_admin() {
    let app: Router = build_router(create_test_app_state());
    let admin_token: String = bootstrap_admin(&app).await;
    let staff_token: String = staff_session(&app, &admin_token).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/backup", Some(&staff_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);

    let response = app
        .oneshot(get_request("/api/backup", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: String = body_text(response).await;
    assert!(body.starts_with("-- PCINV-BACKUP v1"));
}

#[tokio::test]
async fn test_restore_rejects_unsafe_backup() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/backup/restore",
            Some(&token),
            &json!({ "sql_content": "-- PCINV-BACKUP v1\nDROP TABLE users;\n" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_restore_ends_sessions() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let response = app
        .clone()
        .oneshot(get_request("/api/backup", Some(&token)))
        .await
        .unwrap();
    let backup: String = body_text(response).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/backup/restore",
            Some(&token),
            &json!({ "sql_content": backup }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/whoami", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);

    login(&app, "admin", ADMIN_PASSWORD).await;
}

#[tokio::test]
async fn test_dashboard_lists_online_user() {
    let app: Router = build_router(create_test_app_state());
    let token: String = bootstrap_admin(&app).await;

    let response = app
        .oneshot(get_request("/api/dashboard", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    let online: &Vec<Value> = body["online_users"].as_array().unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0]["username"], json!("admin"));
}

#[test]
fn test_server_config_from_args() {
    let args: Args = Args::parse_from([
        "pcinv-server",
        "--session-hours",
        "2",
        "--presence-timeout-minutes",
        "5",
        "--max-upload-mb",
        "1",
    ]);
    let config: ServerConfig = ServerConfig::from_args(&args);
    assert_eq!(config.session_ttl, Duration::hours(2));
    assert_eq!(config.presence_timeout, Duration::minutes(5));
    assert_eq!(config.max_upload_bytes, 1024 * 1024);
    assert_eq!(config.sweep_interval, std::time::Duration::from_secs(60));
}

#[test]
fn test_zero_sweep_interval_is_rejected() {
    let result = Args::try_parse_from(["pcinv-server", "--sweep-interval-seconds", "0"]);
    assert!(result.is_err());
}
