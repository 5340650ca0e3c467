use std::time::SystemTime;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::mint_access_token;
use crate::db::require_db;
use crate::db::txn::with_txn;
use crate::entities::users;
use crate::error::AppError;
use crate::extractors::validated_json::ValidatedJson;
use crate::routes::parse_role_param;
use crate::services::users as users_service;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
}

/// Mint a token snapshotting the user's identity and role as stored
/// right now.
fn mint_for_user(user: &users::Model, security: &SecurityConfig) -> Result<String, AppError> {
    mint_access_token(
        &user.id.to_string(),
        &user.email,
        &user.role,
        SystemTime::now(),
        security,
    )
}

/// POST /api/auth/register
///
/// Creates a user and returns a freshly minted token. A registration
/// without an explicit role gets the configured default.
async fn register(
    req: HttpRequest,
    body: ValidatedJson<RegisterRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::invalid(
            "EMAIL_AND_PASSWORD_REQUIRED",
            "Email and password are required".to_string(),
        ));
    }

    let requested_role = parse_role_param(payload.role.as_deref())?;
    let default_role = app_state.security.default_role;

    let user = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move {
            users_service::register_user(
                txn,
                &payload.email,
                &payload.password,
                requested_role,
                default_role,
            )
            .await
        })
    })
    .await?;

    let token = mint_for_user(&user, &app_state.security)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered".to_string(),
        token,
    }))
}

/// POST /api/auth/login
///
/// Verifies the password and returns a token. Unknown email and wrong
/// password produce the same response.
async fn login(
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::invalid(
            "EMAIL_AND_PASSWORD_REQUIRED",
            "Email and password are required".to_string(),
        ));
    }

    let db = require_db(&app_state)?;
    let user = users_service::authenticate(db, &payload.email, &payload.password).await?;

    let token = mint_for_user(&user, &app_state.security)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register)));
    cfg.service(web::resource("/login").route(web::post().to(login)));
}
