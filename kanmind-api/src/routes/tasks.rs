/// Task endpoints
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task on a board
/// - `GET /api/tasks/assigned-to-me` - Tasks where the caller is assignee
/// - `GET /api/tasks/reviewing` - Tasks where the caller is reviewer
/// - `PUT|PATCH /api/tasks/:id` - Partially update a task
/// - `DELETE /api/tasks/:id` - Delete a task (board owner or assignee)

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use kanmind_shared::{
    auth::{
        authorization::{board_role, require_board_access, require_task_delete},
        middleware::AuthContext,
    },
    models::{
        board::Board,
        task::{CreateTask, Task, TaskPriority, TaskStatus, TaskView, UpdateTask},
    },
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a task
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Target board
    pub board: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to `to-do`)
    #[serde(default)]
    pub status: TaskStatus,

    /// Initial priority (defaults to `medium`)
    #[serde(default)]
    pub priority: TaskPriority,

    /// Optional assignee; must be the board owner or a member
    pub assignee_id: Option<Uuid>,

    /// Optional reviewer; must be the board owner or a member
    pub reviewer_id: Option<Uuid>,

    /// Optional deadline
    pub due_date: Option<NaiveDate>,
}

/// Request body for updating a task
///
/// Absent fields are left untouched; an explicit `null` clears the nullable
/// ones. The `board` field is accepted only when it matches the task's
/// current board, since tasks cannot move between boards.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// Board reference; must equal the task's board when present
    pub board: Option<Uuid>,

    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee; `null` unassigns
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<Uuid>>,

    /// New deadline; `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an absent field from an explicit `null` during
/// deserialization. Absent stays `None` via `#[serde(default)]`; a present
/// value (including `null`) lands in `Some(..)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Validates that a prospective assignee or reviewer belongs to the board
///
/// Owner and members both qualify. Failures are field-scoped 400s.
async fn ensure_board_user(
    state: &AppState,
    board: &Board,
    user_id: Uuid,
    field: &'static str,
) -> ApiResult<()> {
    match board_role(&state.db, board, user_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation(
            field,
            "User must be the board owner or a board member.",
        )),
    }
}

/// Create a task
///
/// The caller must be owner or member of the target board. Assignee and
/// reviewer, when given, must belong to the board as well.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <token>
///
/// {
///   "board": "6e1f...",
///   "title": "Fix login redirect",
///   "status": "to-do",
///   "priority": "high",
///   "assignee_id": "b2c4..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: empty title, nonexistent board, or
///   assignee/reviewer outside the board
/// - `403 Forbidden`: the caller has no access to the board
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    req.validate().map_err(validation_details)?;

    // A bad board reference is an input problem, not a missing resource
    let board = Board::find_by_id(&state.db, req.board)
        .await?
        .ok_or_else(|| ApiError::validation("board", "Board does not exist."))?;

    if board_role(&state.db, &board, auth.user_id).await?.is_none() {
        return Err(ApiError::Forbidden(
            "Only the board owner or a board member can create tasks.".to_string(),
        ));
    }

    if let Some(assignee_id) = req.assignee_id {
        ensure_board_user(&state, &board, assignee_id, "assignee_id").await?;
    }
    if let Some(reviewer_id) = req.reviewer_id {
        ensure_board_user(&state, &board, reviewer_id, "reviewer_id").await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            board_id: req.board,
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, board_id = %task.board_id, "Task created");

    let view = Task::view(&state.db, task.id)
        .await?
        .ok_or(ApiError::NotFound("Task not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// List tasks assigned to the caller, across all boards
pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let tasks = Task::views_by_assignee(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// List tasks the caller reviews, across all boards
pub async fn reviewing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let tasks = Task::views_by_reviewer(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// Partially update a task
///
/// The response carries the joined view without `comments_count`. Attempting
/// to move the task to another board is rejected before anything is written.
///
/// # Errors
///
/// - `400 Bad Request`: board change attempt, empty title, or
///   assignee/reviewer outside the board
/// - `403 Forbidden`: the caller has no access to the task's board
/// - `404 Not Found`: no such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    req.validate().map_err(validation_details)?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or(ApiError::NotFound("Task not found".to_string()))?;

    require_board_access(&state.db, task.board_id, auth.user_id).await?;

    if let Some(board) = req.board {
        if board != task.board_id {
            return Err(ApiError::validation(
                "board",
                "A task cannot be moved to another board.",
            ));
        }
    }

    let board = Board::find_by_id(&state.db, task.board_id)
        .await?
        .ok_or(ApiError::NotFound("Board not found".to_string()))?;

    if let Some(Some(assignee_id)) = req.assignee_id {
        ensure_board_user(&state, &board, assignee_id, "assignee_id").await?;
    }
    if let Some(Some(reviewer_id)) = req.reviewer_id {
        ensure_board_user(&state, &board, reviewer_id, "reviewer_id").await?;
    }

    let updated = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Task not found".to_string()))?;

    let mut view = Task::view(&state.db, updated.id)
        .await?
        .ok_or(ApiError::NotFound("Task not found".to_string()))?;
    view.comments_count = None;

    Ok(Json(view))
}

/// Delete a task
///
/// Allowed for the board owner and the task's assignee.
///
/// # Errors
///
/// - `403 Forbidden`: the caller is neither board owner nor assignee
/// - `404 Not Found`: no such task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let task = require_task_delete(&state.db, task_id, auth.user_id).await?;

    Task::delete(&state.db, task.id).await?;

    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(req.assignee_id, Some(None));
        assert_eq!(req.reviewer_id, None);

        let req: UpdateTaskRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.assignee_id, None);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"board": "7f34e9a2-4a1b-4d3e-9d3e-9a2b4d3e9d3e", "title": "Ship it"}"#,
        )
        .unwrap();
        assert_eq!(req.status, TaskStatus::ToDo);
        assert_eq!(req.priority, TaskPriority::Medium);
        assert!(req.assignee_id.is_none());
    }
}
