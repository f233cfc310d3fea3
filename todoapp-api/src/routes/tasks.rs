/// Task endpoints
///
/// Every route requires authentication and only ever exposes the caller's
/// own tasks. Single-task routes load the task, then apply the ownership
/// guard (404 before 403), then perform the operation.
///
/// - `GET /api/tasks` - List caller's tasks, newest first
/// - `POST /api/tasks` - Create a task
/// - `GET /api/tasks/:id` - Read one task
/// - `PUT /api/tasks/:id` - Partially update a task
/// - `DELETE /api/tasks/:id` - Delete a task

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use todoapp_shared::{
    auth::{
        authorization::{guard_owned, AccessError},
        middleware::AuthContext,
    },
    models::task::{NewTask, Task, TaskPatch},
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FIELD_TOO_LONG},
    extract::ApiJson,
};

const TITLE_REQUIRED: &str = "Le titre est requis";

/// Create request
///
/// A missing, `null`, empty or over-long title is rejected alike.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTaskRequest {
    #[validate(required, length(min = 1, max = 255))]
    pub title: Option<String>,

    pub description: Option<String>,

    /// Defaults to false
    pub completed: Option<bool>,
}

/// Partial update request
///
/// `description` distinguishes an absent field (unchanged) from an explicit
/// `null` (cleared).
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTaskRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[serde(deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            completed: req.completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskMessageResponse {
    pub message: String,
    pub task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn parse_task_id(raw: &str) -> ApiResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::BadRequest("ID de tâche invalide".to_string()))
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => ApiError::NotFound("Tâche non trouvée".to_string()),
            AccessError::Forbidden => {
                ApiError::Forbidden("Accès non autorisé à cette tâche".to_string())
            }
        }
    }
}

/// Loads a task and checks the caller owns it
async fn load_owned_task(state: &AppState, auth: &AuthContext, id: i32) -> ApiResult<Task> {
    let task = state.tasks.find_by_id(id).await?;
    Ok(guard_owned(task, auth)?)
}

/// Creates a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskMessageResponse>)> {
    req.validate()
        .map_err(|_| ApiError::BadRequest(TITLE_REQUIRED.to_string()))?;
    let Some(title) = req.title else {
        return Err(ApiError::BadRequest(TITLE_REQUIRED.to_string()));
    };

    // A still-valid token for a deleted account surfaces as 404 from the store
    let task = state
        .tasks
        .create(NewTask {
            title,
            description: req.description,
            completed: req.completed.unwrap_or(false),
            user_id: auth.user_id,
        })
        .await?;

    tracing::info!(user_id = auth.user_id, task_id = task.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskMessageResponse {
            message: "Tâche créée avec succès".to_string(),
            task,
        }),
    ))
}

/// Lists the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = state.tasks.list_by_user(auth.user_id).await?;
    Ok(Json(TaskListResponse { tasks }))
}

/// Reads one of the caller's tasks
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&id)?;
    let task = load_owned_task(&state, &auth, id).await?;

    Ok(Json(TaskResponse { task }))
}

/// Applies a partial update to one of the caller's tasks
///
/// `updated_at` is refreshed even when no field changes.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskMessageResponse>> {
    let id = parse_task_id(&id)?;
    load_owned_task(&state, &auth, id).await?;

    if req.title.as_deref() == Some("") {
        return Err(ApiError::BadRequest(TITLE_REQUIRED.to_string()));
    }
    req.validate()
        .map_err(|_| ApiError::BadRequest(FIELD_TOO_LONG.to_string()))?;

    // The row can vanish between the guard and the write
    let task = state
        .tasks
        .update(id, req.into())
        .await?
        .ok_or(AccessError::NotFound)?;

    tracing::info!(user_id = auth.user_id, task_id = id, "Task updated");

    Ok(Json(TaskMessageResponse {
        message: "Tâche mise à jour avec succès".to_string(),
        task,
    }))
}

/// Deletes one of the caller's tasks
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_task_id(&id)?;
    load_owned_task(&state, &auth, id).await?;

    if !state.tasks.delete(id).await? {
        return Err(AccessError::NotFound.into());
    }

    tracing::info!(user_id = auth.user_id, task_id = id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Tâche supprimée avec succès".to_string(),
    }))
}
