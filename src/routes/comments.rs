use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Comment, CommentRequest},
    notify::{self, MutationEvent},
    response,
    state::AppState,
    store::Store,
};
use actix_web::{delete, get, http::StatusCode, patch, post, web, Responder};
use uuid::Uuid;
use validator::Validate;

const NOT_PERMITTED: &str = "Forbidden: You do not have permission to update/delete this comment";

/// The comment, provided it exists and belongs to `task_id`.
async fn comment_on_task(
    store: &dyn Store,
    task_id: Uuid,
    comment_id: Uuid,
) -> Result<Comment, AppError> {
    match store.find_comment(comment_id).await? {
        Some(comment) if comment.task_id == task_id => Ok(comment),
        _ => Err(AppError::NotFound("Comment not found".into())),
    }
}

/// Adds a comment to a task. The task's creator is notified unless they wrote it.
#[post("/{task_id}/comments")]
pub async fn create_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let store = state.store.as_ref();

    let task = store
        .find_task(task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    let comment = Comment::new(task.id, user.id, body.into_inner().content);
    store.insert_comment(&comment).await?;

    notify::dispatch(store, [MutationEvent::comment_created(&task, &user)]).await;

    response::with_payload(
        StatusCode::CREATED,
        "Comment created successfully",
        "data",
        &comment,
    )
}

/// Comments of a task, oldest first, each with its author.
#[get("/{task_id}/comments")]
pub async fn get_comments(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    if state.store.find_task(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let comments = state.store.list_comments(task_id).await?;

    response::with_payload(StatusCode::OK, "Comments fetched", "data", &comments)
}

/// Rewrites a comment. Only its author or an admin may do this.
#[patch("/{task_id}/comments/{comment_id}")]
pub async fn update_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let (task_id, comment_id) = path.into_inner();

    let comment = comment_on_task(state.store.as_ref(), task_id, comment_id).await?;
    if !user.can_modify(comment.author_id) {
        return Err(AppError::Forbidden(NOT_PERMITTED.into()));
    }

    let updated = state
        .store
        .update_comment(comment.id, &body.content)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

    response::with_payload(
        StatusCode::OK,
        "Comment updated successfully",
        "data",
        &updated,
    )
}

/// Removes a comment for good. Only its author or an admin may do this.
#[delete("/{task_id}/comments/{comment_id}")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (task_id, comment_id) = path.into_inner();

    let comment = comment_on_task(state.store.as_ref(), task_id, comment_id).await?;
    if !user.can_modify(comment.author_id) {
        return Err(AppError::Forbidden(NOT_PERMITTED.into()));
    }

    if !state.store.delete_comment(comment.id).await? {
        return Err(AppError::NotFound("Comment not found".into()));
    }

    Ok(response::message(
        StatusCode::OK,
        "Comment deleted successfully",
    ))
}
