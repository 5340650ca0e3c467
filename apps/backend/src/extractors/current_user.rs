use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;

use crate::auth::jwt::Claims;
use crate::auth::role::Role;
use crate::error::{AppError, AuthReason};

/// Identity of the authenticated caller for the current request.
///
/// Built from the verified claims stored in request extensions by the
/// bearer-auth middleware. Claims are trusted as issued: there is no
/// store lookup here, so a role change or deletion only takes effect
/// once the token expires or is reissued. Request-scoped, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        std::future::ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(AppError::unauthorized_missing_bearer)?;

    // sub carries the user id; a non-numeric sub means the token was
    // not one of ours.
    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::unauthorized(AuthReason::MalformedToken))?;

    Ok(CurrentUser {
        id,
        email: claims.email,
        role: Role::parse(&claims.role).unwrap_or_default(),
    })
}
