//! Problem-details response shape and trace id propagation.

mod support;

use actix_web::{test, web, HttpResponse};
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::AppError;
use support::app_builder::create_test_app;

async fn test_error_handler() -> Result<HttpResponse, AppError> {
    Err(AppError::invalid(
        "INVALID_EXAMPLE",
        "Example failure".to_string(),
    ))
}

#[actix_web::test]
async fn test_error_shape() {
    let state = AppState::without_db(SecurityConfig::default());
    let app = create_test_app(state)
        .with_routes(|cfg| {
            cfg.route("/_test/error", web::get().to(test_error_handler));
        })
        .build()
        .await
        .unwrap();

    let req = test::TestRequest::get().uri("/_test/error").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);

    // Extract headers before reading body to avoid borrowing issues
    let headers = resp.headers().clone();
    let request_id = headers
        .get("x-request-id")
        .expect("x-request-id header present")
        .to_str()
        .unwrap()
        .to_string();
    assert!(!request_id.is_empty());

    let trace_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header present")
        .to_str()
        .unwrap()
        .to_string();

    let content_type = headers.get("content-type").unwrap().to_str().unwrap();
    assert_eq!(content_type, "application/problem+json");

    let problem_details: serde_json::Value = test::read_body_json(resp).await;

    assert!(problem_details.get("type").is_some());
    assert!(problem_details.get("title").is_some());
    assert!(problem_details.get("status").is_some());
    assert!(problem_details.get("detail").is_some());
    assert!(problem_details.get("code").is_some());
    assert!(problem_details.get("trace_id").is_some());

    assert_eq!(problem_details["code"], "INVALID_EXAMPLE");
    assert_eq!(problem_details["detail"], "Example failure");
    assert_eq!(problem_details["status"], 400);

    // The body trace_id matches both tracing headers
    let trace_id_in_body = problem_details["trace_id"].as_str().unwrap();
    assert_eq!(trace_id_in_body, request_id);
    assert_eq!(trace_id_in_body, trace_header);
}

#[actix_web::test]
async fn test_auth_error_shape_is_generic() {
    // A 401 from the prod wiring carries no hint of which check
    // failed.
    let state = AppState::without_db(SecurityConfig::default());
    let app = create_test_app(state).with_prod_routes().build().await.unwrap();

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["detail"], "Authentication required");
    assert!(body.get("reason").is_none());
}
