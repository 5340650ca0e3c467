//! Role gate middleware.
//!
//! Composed after [`BearerAuth`](super::bearer_auth::BearerAuth) on
//! scopes that require an elevated role. Reads the verified claims
//! from request extensions: no claims means the auth middleware did
//! not run, which is rejected as unauthenticated rather than letting
//! the request through. A role string that does not parse to the
//! required role is rejected with 403.

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::{Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::jwt::Claims;
use crate::auth::role::Role;
use crate::error::AppError;

pub struct RequireRole {
    required: Role,
}

impl RequireRole {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service,
            required: self.required,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: S,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();

        let claims = match claims {
            Some(claims) => claims,
            // BearerAuth did not run: composition precondition
            // violated, fail closed as unauthenticated.
            None => {
                return Box::pin(ready(Ok(reject(
                    req,
                    AppError::unauthorized_missing_bearer(),
                ))))
            }
        };

        if Role::parse(&claims.role) != Some(self.required) {
            return Box::pin(ready(Ok(reject(req, AppError::forbidden()))));
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    let (req, _payload) = req.into_parts();
    let res = err.error_response().map_into_right_body();
    ServiceResponse::new(req, res)
}
