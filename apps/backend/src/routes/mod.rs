use actix_web::web;
use serde::Serialize;

pub mod activity;
pub mod admin;
pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;

use crate::auth::role::Role;
use crate::error::AppError;
use crate::middleware::bearer_auth::BearerAuth;
use crate::middleware::require_role::RequireRole;

/// Configure application routes.
///
/// Protected scopes carry their auth middleware here so `main` and
/// the test harness share the same wiring. Within a scope the
/// last-registered wrap runs first, so BearerAuth always precedes
/// RequireRole.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Auth routes: /api/auth/**
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));

    // Task routes: /api/tasks/**
    cfg.service(
        web::scope("/api/tasks")
            .wrap(BearerAuth)
            .configure(tasks::configure_routes),
    );

    // Comment routes: /api/comments/**
    cfg.service(
        web::scope("/api/comments")
            .wrap(BearerAuth)
            .configure(comments::configure_routes),
    );

    // Activity routes: /api/activity/**
    cfg.service(
        web::scope("/api/activity")
            .wrap(BearerAuth)
            .configure(activity::configure_routes),
    );

    // Admin routes: /api/admin/** (role gate composed after auth)
    cfg.service(
        web::scope("/api/admin")
            .wrap(RequireRole::admin())
            .wrap(BearerAuth)
            .configure(admin::configure_routes),
    );
}

/// Plain acknowledgement body for deletes and similar operations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Parse an optional role parameter from a request body. Unknown role
/// strings are rejected rather than stored verbatim.
pub(crate) fn parse_role_param(role: Option<&str>) -> Result<Option<Role>, AppError> {
    match role {
        None => Ok(None),
        Some(raw) => Role::parse(raw).map(Some).ok_or_else(|| {
            AppError::invalid("INVALID_ROLE", format!("Unknown role: '{raw}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_role_param;
    use crate::auth::role::Role;

    #[test]
    fn test_parse_role_param() {
        assert_eq!(parse_role_param(None).unwrap(), None);
        assert_eq!(parse_role_param(Some("admin")).unwrap(), Some(Role::Admin));
        assert_eq!(parse_role_param(Some("user")).unwrap(), Some(Role::User));
        assert!(parse_role_param(Some("root")).is_err());
    }
}
