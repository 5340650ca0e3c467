//! User management routes, gated to the admin role.
//!
//! The scope wiring composes `RequireRole::admin()` after
//! `BearerAuth`; handlers here never see a request that has not
//! passed both.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::txn::with_txn;
use crate::entities::users;
use crate::error::AppError;
use crate::extractors::validated_json::ValidatedJson;
use crate::routes::{parse_role_param, MessageResponse};
use crate::services::users as users_service;
use crate::state::app_state::AppState;

/// Sanitized user view; the password hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role: String,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
}

/// GET /api/admin/users
async fn list_users(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let users = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { users_service::list_users(txn).await })
    })
    .await?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/admin/users
async fn create_user(
    req: HttpRequest,
    body: ValidatedJson<CreateUserRequest>,
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

    Ok(HttpResponse::Created().json(CreateUserResponse {
        message: "User created".to_string(),
        user: UserResponse::from(user),
    }))
}

/// DELETE /api/admin/users/{user_id}
async fn delete_user(
    req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { users_service::delete_user(txn, user_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users").route(web::get().to(list_users)).route(web::post().to(create_user)));
    cfg.service(web::resource("/users/{user_id}").route(web::delete().to(delete_user)));
}
