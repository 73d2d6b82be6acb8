//! End-to-end flows through the router against PostgreSQL.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use migration::MigratorTrait;
use models::db::DatabaseConfig;
use models::pool::DbPool;
use serde_json::{json, Value};
use service::identity::KeySet;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::build_router;
use server::state::AppState;

const PRIVATE_PEM: &str = include_str!("../../service/testdata/rsa_test_key.pem");
const JWKS_JSON: &str = include_str!("../../service/testdata/jwks.json");

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn app() -> anyhow::Result<Router> {
    let mut cfg = DatabaseConfig::default();
    cfg.apply_env(&|k: &str| std::env::var(k).ok());
    cfg.min_connections = 1;
    let pool = DbPool::connect(cfg).await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(pool.conn().as_ref(), None).await })
        .await?;
    let jwks: JwkSet = serde_json::from_str(JWKS_JSON)?;
    Ok(build_router(AppState::new(Arc::clone(&pool), KeySet::from_set(jwks)), CorsLayer::very_permissive()))
}

fn bearer(email: &str, role: Option<&str>) -> String {
    let mut claims = json!({"email": email, "exp": chrono::Utc::now().timestamp() + 600});
    if let Some(r) = role {
        claims["role"] = json!(r);
    }
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("test-key-1".into());
    let token = encode(&header, &claims, &EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap()).unwrap();
    format!("Bearer {token}")
}

fn email() -> String {
    format!("e2e_{}@example.com", Uuid::new_v4())
}

async fn send(app: &Router, method: Method, uri: &str, auth: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri).header("authorization", auth);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body)?).await?;
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

#[tokio::test]
async fn e2e_first_request_creates_user() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = app().await?;
    let who = email();
    let (status, me) = send(&app, Method::GET, "/api/me", &bearer(&who, None), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], who.as_str());
    assert_eq!(me["role"], "user");
    assert_eq!(me["annualAllowance"], 10);

    let (_, again) = send(&app, Method::GET, "/api/me", &bearer(&who, None), None).await?;
    assert_eq!(again["id"], me["id"]);
    let (status, _) = send(&app, Method::GET, "/api/users", &bearer(&who, None), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn e2e_leave_edit_replaces_days() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = app().await?;
    let me = bearer(&email(), None);

    let (status, created) = send(&app, Method::POST, "/api/leaves", &me, Some(json!({
        "type": "annual", "startDate": "2033-03-07", "endDate": "2033-03-11", "reason": "trip"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["totalLeaveDays"], 5.0);
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let (status, edited) = send(&app, Method::PATCH, &format!("/api/leaves/{id}"), &me, Some(json!({
        "startDate": "2033-03-09", "endDate": "2033-03-15"
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["totalLeaveDays"], 5.0);

    let (_, days) = send(&app, Method::GET, &format!("/api/leaves/{id}/days"), &me, None).await?;
    let dates: Vec<&str> = days.as_array().unwrap().iter().filter_map(|d| d["date"].as_str()).collect();
    assert_eq!(dates, vec!["2033-03-09", "2033-03-10", "2033-03-11", "2033-03-14", "2033-03-15"]);

    let (status, err) = send(&app, Method::PATCH, &format!("/api/leaves/{id}"), &me, Some(json!({
        "startDate": "2033-03-09", "endDate": "2033-03-10", "isHalfDay": true, "halfDayPeriod": "morning"
    }))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "CONFLICT");

    let other = bearer(&email(), None);
    let (status, _) = send(&app, Method::PATCH, &format!("/api/leaves/{id}"), &other, Some(json!({}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/leaves/{id}"), &me, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn e2e_booking_conflict_and_envelope() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = app().await?;
    let admin = bearer(&email(), Some("admin"));
    let user = bearer(&email(), None);

    let (status, res) = send(&app, Method::POST, "/api/resources", &admin, Some(json!({
        "name": format!("e2e-room-{}", Uuid::new_v4()), "type": "room", "specs": {"seats":  6}
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(res["success"], true);
    let room = res["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, first) = send(&app, Method::POST, "/api/bookings", &user, Some(json!({
        "resourceId": room, "start": "2033-03-10T09:00:00Z", "end": "2033-03-10T11:00:00Z", "details": {"note": "standup"}
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["status"], "pending");
    assert_eq!(first["data"]["details"]["note"], "standup");

    let (status, err) = send(&app, Method::POST, "/api/bookings", &admin, Some(json!({
        "resourceId": room, "start": "2033-03-10T10:00:00Z", "end": "2033-03-10T12:00:00Z"
    }))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "CONFLICT");

    let (status, _) = send(&app, Method::POST, "/api/bookings", &admin, Some(json!({
        "resourceId": room, "start": "2033-03-10T11:00:00Z", "end": "2033-03-10T12:00:00Z"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let id = first["data"]["id"].as_str().unwrap_or_default().to_string();
    let (status, err) = send(&app, Method::POST, &format!("/api/bookings/{id}/process"), &user, Some(json!({"status": "confirmed"}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["error"]["code"], "FORBIDDEN");

    let (status, cancelled) = send(&app, Method::DELETE, &format!("/api/bookings/{id}"), &user, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["data"]["status"], "cancelled");

    let (status, stats) = send(&app, Method::GET, "/api/stats", &user, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["data"].is_array());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/resources/{room}"), &admin, None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_bad_input_uses_error_body() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = app().await?;
    let me = bearer(&email(), None);

    let (status, err) = send(&app, Method::GET, "/api/leaves/not-a-uuid", &me, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["code"], "INVALID_REQUEST");

    let (status, err) = send(&app, Method::POST, "/api/leaves", &me, Some(json!({
        "type": "vacation", "startDate": "2033-03-07", "endDate": "2033-03-07"
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["code"], "INVALID_TYPE");

    let (status, err) = send(&app, Method::POST, "/api/bookings", &me, Some(json!({
        "resourceId": Uuid::new_v4(), "start": "2033-03-10T11:00:00Z", "end": "2033-03-10T10:00:00Z"
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["code"], "INVALID_RANGE");
    Ok(())
}
