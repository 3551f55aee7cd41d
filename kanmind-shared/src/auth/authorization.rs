/// Board-level authorization checks
///
/// Every operation resolves the caller's role relative to the target board
/// (or the board behind a task/comment) before touching the stores. The
/// matrix is small and fixed:
///
/// | Action                    | Allowed for                      |
/// |---------------------------|----------------------------------|
/// | board retrieve/update     | owner or member                  |
/// | board delete              | owner                            |
/// | task create/update        | owner or member of target board  |
/// | task delete               | board owner or task assignee     |
/// | comment list/create       | owner or member of task's board  |
/// | comment delete            | comment author                   |
///
/// The authenticated identity is always passed in explicitly.
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::auth::authorization::require_board_access;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let role = require_board_access(&pool, board_id, user_id).await?;
/// println!("caller acts as {:?}", role);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{board::Board, comment::Comment, task::Task};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither owner nor member of the board
    #[error("Not the owner or a member of board {0}")]
    NotBoardMember(Uuid),

    /// Action is reserved for the board owner
    #[error("Only the board owner can perform this action")]
    NotBoardOwner,

    /// Action is reserved for the board owner or the task assignee
    #[error("Only the board owner or the task assignee can perform this action")]
    NotOwnerOrAssignee,

    /// Action is reserved for the comment author
    #[error("Only the comment author can perform this action")]
    NotCommentAuthor,

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Caller's relationship to a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardRole {
    /// The board's owner; unrestricted rights
    Owner,

    /// An explicit member; collaborative access
    Member,
}

/// Resolves a user's role on a board
///
/// Returns `None` when the user is neither the owner nor a member. The owner
/// check short-circuits the membership lookup since ownership alone grants
/// full rights.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn board_role(
    pool: &PgPool,
    board: &Board,
    user_id: Uuid,
) -> Result<Option<BoardRole>, sqlx::Error> {
    if board.owner_id == user_id {
        return Ok(Some(BoardRole::Owner));
    }

    let (is_member,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2)",
    )
    .bind(board.id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(is_member.then_some(BoardRole::Member))
}

/// Checks whether a user may act as owner or member on a board
///
/// Used for board retrieve/update, task create/update and comment
/// list/create.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` for an unknown board and
/// `AuthzError::NotBoardMember` when the user has no role on it.
pub async fn require_board_access(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<BoardRole, AuthzError> {
    let board = Board::find_by_id(pool, board_id)
        .await?
        .ok_or(AuthzError::NotFound("Board"))?;

    board_role(pool, &board, user_id)
        .await?
        .ok_or(AuthzError::NotBoardMember(board_id))
}

/// Checks whether a user owns a board
///
/// Used for board deletion.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` for an unknown board and
/// `AuthzError::NotBoardOwner` for anyone else, members included.
pub async fn require_board_owner(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<Board, AuthzError> {
    let board = Board::find_by_id(pool, board_id)
        .await?
        .ok_or(AuthzError::NotFound("Board"))?;

    if board.owner_id != user_id {
        return Err(AuthzError::NotBoardOwner);
    }

    Ok(board)
}

/// Checks whether a user may delete a task
///
/// Allowed for the owner of the task's board and for the task's own
/// assignee. A plain member who is neither gets a permission error.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` for an unknown task and
/// `AuthzError::NotOwnerOrAssignee` otherwise.
pub async fn require_task_delete(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<Task, AuthzError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(AuthzError::NotFound("Task"))?;

    if task.assignee_id == Some(user_id) {
        return Ok(task);
    }

    let board = Board::find_by_id(pool, task.board_id)
        .await?
        .ok_or(AuthzError::NotFound("Board"))?;

    if board.owner_id != user_id {
        return Err(AuthzError::NotOwnerOrAssignee);
    }

    Ok(task)
}

/// Checks whether a user may access the comments of a task
///
/// Same rule as board access, resolved through the task's board.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` for an unknown task and
/// `AuthzError::NotBoardMember` when the user has no role on the board.
pub async fn require_comment_access(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<Task, AuthzError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(AuthzError::NotFound("Task"))?;

    require_board_access(pool, task.board_id, user_id).await?;

    Ok(task)
}

/// Checks whether a user authored a comment on the given task
///
/// # Errors
///
/// Returns `AuthzError::NotFound` when the comment does not exist or hangs
/// off a different task, `AuthzError::NotCommentAuthor` for non-authors.
pub async fn require_comment_author(
    pool: &PgPool,
    task_id: Uuid,
    comment_id: Uuid,
    user_id: Uuid,
) -> Result<Comment, AuthzError> {
    let comment = Comment::find_by_id(pool, comment_id)
        .await?
        .filter(|c| c.task_id == task_id)
        .ok_or(AuthzError::NotFound("Comment"))?;

    if comment.author_id != user_id {
        return Err(AuthzError::NotCommentAuthor);
    }

    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_role_equality() {
        assert_eq!(BoardRole::Owner, BoardRole::Owner);
        assert_ne!(BoardRole::Owner, BoardRole::Member);
    }

    #[test]
    fn test_authz_error_messages() {
        let err = AuthzError::NotBoardOwner;
        assert_eq!(
            err.to_string(),
            "Only the board owner can perform this action"
        );

        let err = AuthzError::NotFound("Board");
        assert_eq!(err.to_string(), "Board not found");
    }

    // The owner/member matrix itself is exercised against a real database
    // in kanmind-api/tests/integration_test.rs
}
