//! Router behaviour that needs no database: public routes and token rejection.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use models::db::DatabaseConfig;
use models::pool::DbPool;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use service::identity::KeySet;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::routes::build_router;
use server::state::AppState;

const PRIVATE_PEM: &str = include_str!("../../service/testdata/rsa_test_key.pem");
const JWKS_JSON: &str = include_str!("../../service/testdata/jwks.json");

fn app() -> Router {
    let pool = DbPool::new(DatabaseConnection::Disconnected, DatabaseConfig::default());
    let jwks: JwkSet = serde_json::from_str(JWKS_JSON).unwrap();
    build_router(AppState::new(pool, KeySet::from_set(jwks)), CorsLayer::very_permissive())
}

fn rs256(claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("test-key-1".into());
    encode(&header, &claims, &EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap()).unwrap()
}

async fn call(req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app().oneshot(req).await.unwrap();
    let status = res.status();
    (status, to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec())
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri);
    if let Some(a) = auth {
        b = b.header("authorization", a);
    }
    b.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = call(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn metrics_and_openapi_are_public() {
    let (status, body) = call(get("/metrics", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("officedesk_db_pool_swaps"));

    let (status, body) = call(get("/api-docs/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/api/leaves"].is_object());
}

#[tokio::test]
async fn missing_or_malformed_bearer_is_401() {
    for auth in [None, Some("Bearer"), Some("Token abc"), Some("Bearer not.a.jwt")] {
        let (status, body) = call(get("/api/leaves", auth)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{auth:?}");
        let err: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn expired_and_symmetric_tokens_are_401() {
    let now = chrono::Utc::now().timestamp();
    let expired = rs256(json!({"email": "amy@example.com", "exp": now - 3600}));
    let (status, _) = call(get("/api/bookings", Some(&format!("Bearer {expired}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let hs = encode(
        &Header::default(),
        &json!({"email": "amy@example.com", "exp": now + 600}),
        &EncodingKey::from_secret(b"shared"),
    )
    .unwrap();
    let (status, _) = call(get("/api/bookings", Some(&format!("Bearer {hs}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_email_is_401() {
    let now = chrono::Utc::now().timestamp();
    let token = rs256(json!({"sub": "42", "exp": now + 600}));
    let (status, body) = call(get("/api/me", Some(&format!("Bearer {token}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(String::from_utf8(body).unwrap().contains("email claim not found"));
}
