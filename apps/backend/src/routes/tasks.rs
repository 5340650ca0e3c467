//! Task CRUD routes. All handlers operate on the caller's own tasks.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::entities::tasks;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::validated_json::ValidatedJson;
use crate::http::page::PageRequest;
use crate::routes::MessageResponse;
use crate::services::tasks::{self as tasks_service, NewTask, SortOrder, TaskChanges, TaskFilter};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<tasks::Model> for TaskResponse {
    fn from(task: tasks::Model) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            user_id: task.user_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub total_tasks: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub tasks: Vec<TaskResponse>,
}

fn parse_due_date(raw: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|_| {
        AppError::invalid(
            "INVALID_DUE_DATE",
            "due_date must be an RFC 3339 timestamp".to_string(),
        )
    })
}

/// GET /api/tasks
async fn list_tasks(
    req: HttpRequest,
    query: web::Query<ListTasksQuery>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();

    let due_date = query.due_date.as_deref().map(parse_due_date).transpose()?;
    let page = PageRequest::from_params(query.page, query.limit);
    let sort = SortOrder::from_param(query.sort.as_deref());
    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        due_date,
    };
    let user_id = current_user.id;

    let (total, items) = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { tasks_service::list_tasks(txn, user_id, &filter, sort, page).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(TaskListResponse {
        total_tasks: total,
        total_pages: page.total_pages(total),
        current_page: page.page(),
        page_size: page.page_size(),
        tasks: items.into_iter().map(TaskResponse::from).collect(),
    }))
}

/// POST /api/tasks
async fn create_task(
    req: HttpRequest,
    body: ValidatedJson<CreateTaskRequest>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();

    let due_date = match payload.due_date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) if !payload.title.trim().is_empty() => parse_due_date(raw)?,
        _ => {
            return Err(AppError::invalid(
                "TITLE_AND_DUE_DATE_REQUIRED",
                "Title and due date are required".to_string(),
            ))
        }
    };

    let user_id = current_user.id;
    let new_task = NewTask {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        priority: payload.priority,
        due_date,
    };

    let task = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { tasks_service::create_task(txn, user_id, new_task).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(TaskResponse::from(task)))
}

/// PUT /api/tasks/{task_id}
async fn update_task(
    req: HttpRequest,
    path: web::Path<i64>,
    body: ValidatedJson<UpdateTaskRequest>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let payload = body.into_inner();

    let due_date = payload.due_date.as_deref().map(parse_due_date).transpose()?;
    let changes = TaskChanges {
        title: payload.title,
        description: payload.description,
        status: payload.status,
        priority: payload.priority,
        due_date,
    };
    let user_id = current_user.id;

    let task = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { tasks_service::update_task(txn, user_id, task_id, changes).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(TaskResponse::from(task)))
}

/// DELETE /api/tasks/{task_id}
async fn delete_task(
    req: HttpRequest,
    path: web::Path<i64>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let user_id = current_user.id;

    with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { tasks_service::delete_task(txn, user_id, task_id).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Task deleted successfully")))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_tasks))
            .route(web::post().to(create_task)),
    );
    cfg.service(
        web::resource("/{task_id}")
            .route(web::put().to(update_task))
            .route(web::delete().to(delete_task)),
    );
}
