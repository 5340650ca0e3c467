use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{comments, tasks, users};
use crate::error::AppError;
use crate::http::page::PageRequest;

/// Add a comment to an existing task. Any authenticated user may
/// comment; only the task's existence is checked.
pub async fn add_comment(
    conn: &impl ConnectionTrait,
    user_id: i64,
    task_id: i64,
    content: String,
) -> Result<comments::Model, AppError> {
    let task_exists = tasks::Entity::find_by_id(task_id).one(conn).await?.is_some();
    if !task_exists {
        return Err(AppError::not_found(
            "TASK_NOT_FOUND",
            "Task not found".to_string(),
        ));
    }

    let comment = comments::ActiveModel {
        id: NotSet,
        content: Set(content),
        task_id: Set(task_id),
        user_id: Set(user_id),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await?;

    Ok(comment)
}

/// Paginated comments for a task, oldest first, each with its author
/// (if the account still exists).
pub async fn list_comments(
    conn: &impl ConnectionTrait,
    task_id: i64,
    page: PageRequest,
) -> Result<(u64, Vec<(comments::Model, Option<users::Model>)>), AppError> {
    let total = comments::Entity::find()
        .filter(comments::Column::TaskId.eq(task_id))
        .count(conn)
        .await?;

    let items = comments::Entity::find()
        .filter(comments::Column::TaskId.eq(task_id))
        .find_also_related(users::Entity)
        .order_by_asc(comments::Column::CreatedAt)
        .offset(page.offset())
        .limit(page.limit())
        .all(conn)
        .await?;

    Ok((total, items))
}
