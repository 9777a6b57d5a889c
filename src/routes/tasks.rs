use crate::{
    auth::{CurrentUser, RequireRole},
    error::AppError,
    models::{
        BulkStatusUpdateRequest, CreateTaskRequest, StatusUpdateRequest, Task, TaskQuery,
        UpdateTaskRequest,
    },
    notify::{self, MutationEvent},
    response,
    state::AppState,
    store::Store,
};
use actix_web::{delete, get, http::StatusCode, patch, post, web, Responder};
use uuid::Uuid;
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

async fn ensure_parent_exists(store: &dyn Store, parent_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(parent_id) = parent_id {
        if store.find_task(parent_id).await?.is_none() {
            return Err(AppError::NotFound("Parent task not found".into()));
        }
    }
    Ok(())
}

async fn ensure_users_exist(store: &dyn Store, user_ids: &[Uuid]) -> Result<(), AppError> {
    for &user_id in user_ids {
        match store.find_user(user_id).await? {
            Some(user) if !user.deleted => {}
            _ => return Err(AppError::NotFound("Participant not found".into())),
        }
    }
    Ok(())
}

/// Lists tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): exact status match.
/// - `search` (optional): case-insensitive match against title and content.
/// - `parent_id` (optional): only subtasks of this task.
/// - `include_deleted` (optional, default `false`): also return soft-deleted tasks.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = state.store.list_tasks(&query_params).await?;

    response::with_payload(StatusCode::OK, "Tasks fetched", "tasks", &tasks)
}

/// Fetches one task by id. Soft-deleted tasks are returned with `deleted: true`.
#[get("/detail/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state
        .store
        .find_task(task_id.into_inner())
        .await?
        .ok_or_else(task_not_found)?;

    response::with_payload(StatusCode::OK, "Task fetched", "task", &task)
}

/// Creates a task owned by the caller.
///
/// ## Responses:
/// - `201 Created`: `{ code, message, task }`; status defaults to `"initial"`.
/// - `400 Bad Request`: payload failed validation.
/// - `404 Not Found`: `parent_id` names no task, or a participant names no user.
#[post("/create")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    ensure_parent_exists(state.store.as_ref(), task_data.parent_id).await?;
    ensure_users_exist(state.store.as_ref(), &task_data.participants).await?;

    let task = Task::new(task_data.into_inner(), user.id);
    state.store.insert_task(&task).await?;
    log::info!("user {} created task {}", user.id, task.id);

    response::with_payload(
        StatusCode::CREATED,
        "Task created successfully",
        "task",
        &task,
    )
}

/// Applies a partial update to a live task.
///
/// Every participant must name an existing user (404 otherwise). Users added to
/// `participants` by this update are notified after the task is saved.
#[patch("/update/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_id = task_id.into_inner();
    let store = state.store.as_ref();

    let mut task = match store.find_task(task_id).await? {
        Some(task) if !task.deleted => task,
        _ => return Err(task_not_found()),
    };
    if task_data.parent_id == Some(task_id) {
        return Err(AppError::BadRequest("A task cannot be its own parent".into()));
    }
    ensure_parent_exists(store, task_data.parent_id).await?;
    if let Some(participants) = &task_data.participants {
        ensure_users_exist(store, participants).await?;
    }

    let added = task.merge(task_data.into_inner());
    if !store.save_task(&task).await? {
        return Err(task_not_found());
    }

    let events = MutationEvent::participants_added(&task, &user, added);
    notify::dispatch(store, events).await;

    response::with_payload(StatusCode::OK, "Task updated successfully", "task", &task)
}

/// Soft-deletes a task. Admins only; comments are left in place.
#[delete("/delete/{id}", wrap = "RequireRole::admin()")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    if !state.store.soft_delete_task(task_id).await? {
        return Err(task_not_found());
    }
    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(task_not_found)?;
    log::info!("admin {} deleted task {}", user.id, task_id);

    response::with_payload(StatusCode::OK, "Task deleted successfully", "task", &task)
}

/// Sets the status of one live task. Any non-empty string is accepted.
#[patch("/update-status/{id}")]
pub async fn update_status(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let task = state
        .store
        .update_task_status(task_id.into_inner(), &body.status)
        .await?
        .ok_or_else(task_not_found)?;

    response::with_payload(StatusCode::OK, "Task status updated", "task", &task)
}

/// Sets one status on many tasks. Ids that match no live task are skipped; the
/// response carries only the `matched`/`modified` counts.
#[patch("/update-multiple")]
pub async fn update_multiple(
    state: web::Data<AppState>,
    body: web::Json<BulkStatusUpdateRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let result = state
        .store
        .update_status_many(&body.ids, &body.status)
        .await?;
    log::debug!(
        "bulk status '{}': {} requested, {} matched, {} modified",
        body.status,
        body.ids.len(),
        result.matched,
        result.modified
    );

    response::with_payload(StatusCode::OK, "Tasks updated", "tasks", &result)
}
