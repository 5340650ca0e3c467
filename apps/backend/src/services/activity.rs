use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{activity_logs, users};
use crate::error::AppError;

/// Append an entry to a task's activity trail. Callers run this on
/// the same transaction as the task write it describes.
pub async fn record(
    conn: &impl ConnectionTrait,
    action: &str,
    task_id: i64,
    user_id: i64,
) -> Result<activity_logs::Model, AppError> {
    let entry = activity_logs::ActiveModel {
        id: NotSet,
        action: Set(action.to_string()),
        task_id: Set(task_id),
        user_id: Set(user_id),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await?;

    Ok(entry)
}

/// All activity for a task, newest first, with the acting user (if
/// still present).
pub async fn list_for_task(
    conn: &impl ConnectionTrait,
    task_id: i64,
) -> Result<Vec<(activity_logs::Model, Option<users::Model>)>, AppError> {
    activity_logs::Entity::find()
        .filter(activity_logs::Column::TaskId.eq(task_id))
        .find_also_related(users::Entity)
        .order_by_desc(activity_logs::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(AppError::from)
}
