/// Comment endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks/:task_id/comments` - List comments, oldest first
/// - `POST /api/tasks/:task_id/comments` - Add a comment
/// - `DELETE /api/tasks/:task_id/comments/:comment_id` - Delete own comment

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanmind_shared::{
    auth::{
        authorization::{require_comment_access, require_comment_author},
        middleware::AuthContext,
    },
    models::{
        comment::{Comment, CommentView},
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Request body for creating a comment
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    /// Comment text; must be non-empty after trimming
    pub content: String,
}

/// List all comments on a task
///
/// # Errors
///
/// - `403 Forbidden`: the caller has no access to the task's board
/// - `404 Not Found`: no such task
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    require_comment_access(&state.db, task_id, auth.user_id).await?;

    let comments = Comment::list_by_task(&state.db, task_id).await?;

    Ok(Json(comments))
}

/// Add a comment to a task
///
/// The caller becomes the author; authorship is what later permits deletion.
///
/// # Errors
///
/// - `400 Bad Request`: blank content
/// - `403 Forbidden`: the caller has no access to the task's board
/// - `404 Not Found`: no such task
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::validation("content", "Content must not be empty."));
    }

    require_comment_access(&state.db, task_id, auth.user_id).await?;

    let comment = Comment::create(&state.db, task_id, auth.user_id, content).await?;

    let author = User::find_by_id(&state.db, comment.author_id)
        .await?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentView {
            id: comment.id,
            author: author.full_name,
            content: comment.content,
            created_at: comment.created_at,
        }),
    ))
}

/// Delete a comment
///
/// Author only; board owners cannot remove other people's comments.
///
/// # Errors
///
/// - `403 Forbidden`: the caller did not write the comment
/// - `404 Not Found`: no such comment under this task
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let comment = require_comment_author(&state.db, task_id, comment_id, auth.user_id).await?;

    Comment::delete(&state.db, comment.id).await?;

    tracing::info!(comment_id = %comment.id, user_id = %auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
