use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tasks::Model as Task;
use time::OffsetDateTime;
use tracing::info;

use crate::entities::tasks;
use crate::error::AppError;
use crate::http::page::PageRequest;
use crate::services::activity;

pub const DEFAULT_STATUS: &str = "pending";
pub const DEFAULT_PRIORITY: &str = "medium";

/// Sort direction for task listings. Anything other than an explicit
/// "asc" sorts newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Default)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

/// List the caller's tasks with equality filters and pagination.
/// Returns the unpaginated total alongside the requested page.
pub async fn list_tasks(
    conn: &impl ConnectionTrait,
    user_id: i64,
    filter: &TaskFilter,
    sort: SortOrder,
    page: PageRequest,
) -> Result<(u64, Vec<Task>), AppError> {
    let mut query = tasks::Entity::find().filter(tasks::Column::UserId.eq(user_id));

    if let Some(status) = &filter.status {
        query = query.filter(tasks::Column::Status.eq(status.as_str()));
    }
    if let Some(priority) = &filter.priority {
        query = query.filter(tasks::Column::Priority.eq(priority.as_str()));
    }
    if let Some(due_date) = filter.due_date {
        query = query.filter(tasks::Column::DueDate.eq(due_date));
    }

    let total = query.clone().count(conn).await?;

    let order = match sort {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };

    let items = query
        .order_by(tasks::Column::CreatedAt, order)
        .offset(page.offset())
        .limit(page.limit())
        .all(conn)
        .await?;

    Ok((total, items))
}

/// Create a task for the caller and record the "created" activity
/// entry on the same connection.
pub async fn create_task(
    conn: &impl ConnectionTrait,
    user_id: i64,
    new_task: NewTask,
) -> Result<Task, AppError> {
    let now = OffsetDateTime::now_utc();

    let task = tasks::ActiveModel {
        id: NotSet,
        title: Set(new_task.title),
        description: Set(new_task.description),
        status: Set(new_task
            .status
            .unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        priority: Set(new_task
            .priority
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string())),
        due_date: Set(new_task.due_date),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    activity::record(conn, "created", task.id, user_id).await?;

    info!(task_id = task.id, user_id = user_id, "task created");
    Ok(task)
}

/// Fetch a task the caller owns. A task that does not exist and a
/// task owned by someone else are both reported as not found, so the
/// response does not reveal other users' task ids.
async fn find_owned(
    conn: &impl ConnectionTrait,
    user_id: i64,
    task_id: i64,
) -> Result<Task, AppError> {
    let task = tasks::Entity::find_by_id(task_id).one(conn).await?;

    match task {
        Some(task) if task.user_id == user_id => Ok(task),
        _ => Err(AppError::not_found(
            "TASK_NOT_FOUND",
            "Task not found".to_string(),
        )),
    }
}

/// Apply a partial update to a task the caller owns; fields left
/// unset keep their stored values.
pub async fn update_task(
    conn: &impl ConnectionTrait,
    user_id: i64,
    task_id: i64,
    changes: TaskChanges,
) -> Result<Task, AppError> {
    let task = find_owned(conn, user_id, task_id).await?;

    let mut task_active: tasks::ActiveModel = task.into();
    if let Some(title) = changes.title {
        task_active.title = Set(title);
    }
    if let Some(description) = changes.description {
        task_active.description = Set(Some(description));
    }
    if let Some(status) = changes.status {
        task_active.status = Set(status);
    }
    if let Some(priority) = changes.priority {
        task_active.priority = Set(priority);
    }
    if let Some(due_date) = changes.due_date {
        task_active.due_date = Set(due_date);
    }
    task_active.updated_at = Set(OffsetDateTime::now_utc());

    let updated = task_active.update(conn).await?;

    activity::record(conn, "updated", updated.id, user_id).await?;

    Ok(updated)
}

/// Delete a task the caller owns. The "deleted" entry is written
/// first so it commits atomically with the delete.
pub async fn delete_task(
    conn: &impl ConnectionTrait,
    user_id: i64,
    task_id: i64,
) -> Result<(), AppError> {
    let task = find_owned(conn, user_id, task_id).await?;

    activity::record(conn, "deleted", task.id, user_id).await?;
    tasks::Entity::delete_by_id(task.id).exec(conn).await?;

    info!(task_id = task_id, user_id = user_id, "task deleted");
    Ok(())
}
