//! Bearer-auth middleware behavior at the web boundary.
//!
//! Uses a counting handler to verify that rejected requests never
//! reach route handlers, and that every rejection shares the same
//! public 401 body.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web, Error, HttpResponse};
use backend::extractors::current_user::CurrentUser;
use backend::middleware::bearer_auth::BearerAuth;
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::AppError;
use support::app_builder::create_test_app;
use support::auth::{bearer_header, mint_expired_token, mint_test_token};

async fn echo_identity(
    counter: web::Data<AtomicUsize>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(HttpResponse::Ok().json(user))
}

async fn harness() -> (
    impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error>,
    web::Data<AtomicUsize>,
    SecurityConfig,
) {
    let security = SecurityConfig::new("test_secret_key_for_testing_purposes_only".as_bytes());
    let state = AppState::without_db(security.clone());
    let counter = web::Data::new(AtomicUsize::new(0));
    let counter_for_app = counter.clone();

    let app = create_test_app(state)
        .with_routes(move |cfg| {
            cfg.app_data(counter_for_app.clone());
            cfg.service(
                web::scope("/protected")
                    .wrap(BearerAuth)
                    .route("", web::get().to(echo_identity)),
            );
        })
        .build()
        .await
        .unwrap();

    (app, counter, security)
}

/// Flip the last signature character within the base64url alphabet.
fn tamper(token: &str) -> String {
    let mut tampered = token.to_string();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    tampered
}

#[actix_web::test]
async fn test_missing_header_never_reaches_handler() {
    let (app, counter, _security) = harness().await;

    let req = test::TestRequest::get().uri("/protected").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["detail"], "Authentication required");
}

#[actix_web::test]
async fn test_malformed_header_rejected() {
    let (app, counter, _security) = harness().await;

    for value in ["Token abc", "Bearer", "Bearer a b", "bearer abc"] {
        let req = test::TestRequest::get()
            .uri("/protected")
            .insert_header((header::AUTHORIZATION, value))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401, "value: {value}");
    }

    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_expired_token_rejected() {
    let (app, counter, security) = harness().await;

    let token = mint_expired_token("42", "a@b.com", "user", &security);
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_tampered_token_rejected() {
    let (app, counter, security) = harness().await;

    let token = tamper(&mint_test_token("42", "a@b.com", "user", &security));
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_foreign_secret_rejected() {
    let (app, counter, _security) = harness().await;

    let other = SecurityConfig::new("a-different-secret".as_bytes());
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((
            header::AUTHORIZATION,
            bearer_header("42", "a@b.com", "user", &other),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_rejections_share_one_public_body() {
    // Expired and tampered tokens must be indistinguishable from the
    // outside.
    let (app, _counter, security) = harness().await;

    let expired = mint_expired_token("42", "a@b.com", "user", &security);
    let tampered = tamper(&mint_test_token("42", "a@b.com", "user", &security));

    let mut bodies = Vec::new();
    for token in [expired, tampered] {
        let req = test::TestRequest::get()
            .uri("/protected")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        bodies.push((body["code"].clone(), body["detail"].clone()));
    }

    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn test_valid_token_reaches_handler_with_identity() {
    let (app, counter, security) = harness().await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((
            header::AUTHORIZATION,
            bearer_header("42", "a@b.com", "user", &security),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 42);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["role"], "user");
}
