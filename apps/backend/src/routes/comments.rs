use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::entities::{comments, users};
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::validated_json::ValidatedJson;
use crate::http::page::PageRequest;
use crate::services::comments as comments_service;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub task_id: i64,
    /// None when the author account has since been deleted
    pub author_email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CommentResponse {
    fn from_row((comment, author): (comments::Model, Option<users::Model>)) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            task_id: comment.task_id,
            author_email: author.map(|user| user.email),
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub total_comments: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub comments: Vec<CommentResponse>,
}

/// POST /api/comments/{task_id}
async fn create_comment(
    req: HttpRequest,
    path: web::Path<i64>,
    body: ValidatedJson<CreateCommentRequest>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let payload = body.into_inner();

    if payload.content.trim().is_empty() {
        return Err(AppError::invalid(
            "COMMENT_CONTENT_REQUIRED",
            "Comment content is required".to_string(),
        ));
    }

    let user_id = current_user.id;
    let comment = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move {
            comments_service::add_comment(txn, user_id, task_id, payload.content).await
        })
    })
    .await?;

    let author_email = Some(current_user.email);
    Ok(HttpResponse::Created().json(CommentResponse {
        id: comment.id,
        content: comment.content,
        task_id: comment.task_id,
        author_email,
        created_at: comment.created_at,
    }))
}

/// GET /api/comments/{task_id}
async fn list_comments(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ListCommentsQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let page = PageRequest::from_params(query.page, query.limit);

    let (total, rows) = with_txn(Some(&req), &app_state, move |txn| {
        Box::pin(async move { comments_service::list_comments(txn, task_id, page).await })
    })
    .await?;

    Ok(HttpResponse::Ok().json(CommentListResponse {
        total_comments: total,
        total_pages: page.total_pages(total),
        current_page: page.page(),
        page_size: page.page_size(),
        comments: rows.into_iter().map(CommentResponse::from_row).collect(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{task_id}")
            .route(web::post().to(create_comment))
            .route(web::get().to(list_comments)),
    );
}
