/// Board endpoints
///
/// # Endpoints
///
/// - `GET /api/email-check` - Look up a user by email
/// - `GET /api/boards` - List boards visible to the caller
/// - `POST /api/boards` - Create a board
/// - `GET /api/boards/:id` - Board detail with members and tasks
/// - `PUT|PATCH /api/boards/:id` - Update title and/or membership set
/// - `DELETE /api/boards/:id` - Delete a board (owner only)

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use kanmind_shared::{
    auth::{
        authorization::{require_board_access, require_board_owner},
        middleware::AuthContext,
    },
    models::{
        board::{Board, BoardSummary, CreateBoard, UpdateBoard},
        task::{Task, TaskView},
        user::{User, UserSummary},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a board
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Initial member IDs; every ID must reference an existing user
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Request body for updating a board; both fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New membership set (full replace)
    pub members: Option<Vec<Uuid>>,
}

/// Board detail: the board plus its resolved members and tasks
#[derive(Debug, Serialize)]
pub struct BoardDetail {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<TaskView>,
}

/// Response for board updates
#[derive(Debug, Serialize)]
pub struct BoardUpdateResponse {
    pub id: Uuid,
    pub title: String,
    pub owner_data: UserSummary,
    pub members_data: Vec<UserSummary>,
}

/// Query parameters for the email lookup
#[derive(Debug, Deserialize)]
pub struct EmailCheckQuery {
    pub email: Option<String>,
}

/// Resolves a set of member IDs to user summaries, rejecting unknown IDs
///
/// Repeated IDs count once; the membership set has set semantics. Any ID
/// that does not resolve produces a field-scoped 400 naming the offenders.
async fn resolve_members(
    state: &AppState,
    member_ids: &[Uuid],
) -> ApiResult<Vec<UserSummary>> {
    let mut unique: Vec<Uuid> = member_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let found = User::find_summaries_by_ids(&state.db, &unique).await?;

    if found.len() != unique.len() {
        let found_ids: Vec<Uuid> = found.iter().map(|u| u.id).collect();
        let missing: Vec<String> = unique
            .iter()
            .filter(|id| !found_ids.contains(id))
            .map(|id| id.to_string())
            .collect();

        return Err(ApiError::validation(
            "members",
            format!("Unknown user IDs: {}", missing.join(", ")),
        ));
    }

    Ok(found)
}

/// Look up a user by email address
///
/// # Endpoint
///
/// ```text
/// GET /api/email-check?email=jane@example.com
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing `email` parameter
/// - `404 Not Found`: no user with that email
pub async fn email_check(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<UserSummary>> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing email query parameter".to_string()))?;

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserSummary::from(&user)))
}

/// List all boards the caller owns or is a member of
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let boards = Board::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(boards))
}

/// Create a board
///
/// The caller becomes the owner. Member IDs are resolved up front; the
/// owner's own ID is tolerated in the list but not stored as a member row.
///
/// # Errors
///
/// - `400 Bad Request`: empty title or unknown member IDs
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardSummary>)> {
    req.validate().map_err(validation_details)?;

    resolve_members(&state, &req.members).await?;

    let member_ids: Vec<Uuid> = req
        .members
        .into_iter()
        .filter(|id| *id != auth.user_id)
        .collect();

    let board = Board::create(
        &state.db,
        CreateBoard {
            title: req.title,
            owner_id: auth.user_id,
            member_ids,
        },
    )
    .await?;

    tracing::info!(board_id = %board.id, owner_id = %auth.user_id, "Board created");

    let summary = Board::summary(&state.db, board.id)
        .await?
        .ok_or(ApiError::NotFound("Board not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Fetch a board with its members and tasks
///
/// # Errors
///
/// - `403 Forbidden`: the board exists but the caller has no access
/// - `404 Not Found`: no such board
pub async fn retrieve_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetail>> {
    require_board_access(&state.db, board_id, auth.user_id).await?;

    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or(ApiError::NotFound("Board not found".to_string()))?;

    let members = Board::members(&state.db, board_id).await?;
    let tasks = Task::views_by_board(&state.db, board_id).await?;

    Ok(Json(BoardDetail {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
        tasks,
    }))
}

/// Update a board's title and/or membership set
///
/// Members are full-replace: the supplied list becomes the new set. Both
/// owner and members may update. All inputs are validated before any write,
/// and title and membership change in a single transaction, so a failure
/// never leaves a half-applied update.
///
/// # Errors
///
/// - `400 Bad Request`: empty title or unknown member IDs
/// - `403 Forbidden`: the caller has no access to the board
/// - `404 Not Found`: no such board
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<BoardUpdateResponse>> {
    req.validate().map_err(validation_details)?;

    require_board_access(&state.db, board_id, auth.user_id).await?;

    if let Some(member_ids) = &req.members {
        resolve_members(&state, member_ids).await?;
    }

    let board = Board::update(
        &state.db,
        board_id,
        UpdateBoard {
            title: req.title,
            member_ids: req.members,
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Board not found".to_string()))?;

    let owner = User::find_by_id(&state.db, board.owner_id)
        .await?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;
    let members = Board::members(&state.db, board_id).await?;

    Ok(Json(BoardUpdateResponse {
        id: board.id,
        title: board.title,
        owner_data: UserSummary::from(&owner),
        members_data: members,
    }))
}

/// Delete a board
///
/// Owner only. Tasks and comments on the board are removed by the schema
/// cascades.
///
/// # Errors
///
/// - `403 Forbidden`: the caller is not the owner
/// - `404 Not Found`: no such board
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_board_owner(&state.db, board_id, auth.user_id).await?;

    Board::delete(&state.db, board_id).await?;

    tracing::info!(board_id = %board_id, user_id = %auth.user_id, "Board deleted");

    Ok(StatusCode::NO_CONTENT)
}
