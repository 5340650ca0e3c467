use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use tracing::{info, warn};
use users::Model as User;

use crate::auth::password;
use crate::auth::role::Role;
use crate::entities::users;
use crate::error::AppError;
use crate::logging::pii::Redacted;

pub async fn find_by_email(
    conn: &impl ConnectionTrait,
    email: &str,
) -> Result<Option<User>, AppError> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await
        .map_err(AppError::from)
}

pub async fn find_by_id(conn: &impl ConnectionTrait, id: i64) -> Result<Option<User>, AppError> {
    users::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(AppError::from)
}

/// Create a user with a hashed password.
///
/// A registration without an explicit role gets `default_role`; a
/// pre-existing email is a conflict, checked up front so the caller
/// gets a clean 409 rather than a driver-specific unique-violation.
pub async fn register_user(
    conn: &impl ConnectionTrait,
    email: &str,
    password: &str,
    requested_role: Option<Role>,
    default_role: Role,
) -> Result<User, AppError> {
    if find_by_email(conn, email).await?.is_some() {
        return Err(AppError::conflict(
            "USER_ALREADY_EXISTS",
            "User already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(password)?;
    let role = requested_role.unwrap_or(default_role);
    let now = time::OffsetDateTime::now_utc();

    let user = users::ActiveModel {
        id: NotSet,
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    info!(
        user_id = user.id,
        email = %Redacted(email),
        role = %role,
        "user registered"
    );

    Ok(user)
}

/// Look up a user by email and check the password.
///
/// Unknown email and wrong password fail identically so the response
/// does not reveal which one it was.
pub async fn authenticate(
    conn: &impl ConnectionTrait,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = find_by_email(conn, email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !password::verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "failed login attempt");
        return Err(AppError::invalid_credentials());
    }

    Ok(user)
}

pub async fn list_users(conn: &impl ConnectionTrait) -> Result<Vec<User>, AppError> {
    users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(conn)
        .await
        .map_err(AppError::from)
}

pub async fn delete_user(conn: &impl ConnectionTrait, id: i64) -> Result<(), AppError> {
    let user = find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found".to_string()))?;

    users::Entity::delete_by_id(user.id).exec(conn).await?;

    info!(user_id = id, "user deleted");
    Ok(())
}
