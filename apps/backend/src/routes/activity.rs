use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::entities::{activity_logs, users};
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::services::activity as activity_service;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: i64,
    pub action: String,
    pub task_id: i64,
    /// None when the acting account has since been deleted
    pub user_email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ActivityResponse {
    fn from_row((entry, user): (activity_logs::Model, Option<users::Model>)) -> Self {
        Self {
            id: entry.id,
            action: entry.action,
            task_id: entry.task_id,
            user_email: user.map(|u| u.email),
            created_at: entry.created_at,
        }
    }
}

/// GET /api/activity/{task_id}
///
/// The trail survives task deletion, so no existence check: an
/// unknown task simply has no entries.
async fn list_activity(
    req: HttpRequest,
    path: web::Path<i64>,
    _current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();

    let rows = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { activity_service::list_for_task(txn, task_id).await })
    })
    .await?;

    let entries: Vec<ActivityResponse> = rows.into_iter().map(ActivityResponse::from_row).collect();
    Ok(HttpResponse::Ok().json(entries))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{task_id}").route(web::get().to(list_activity)));
}
