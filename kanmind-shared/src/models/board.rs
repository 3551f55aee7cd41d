/// Board model and database operations
///
/// A board has exactly one owner and a set of members stored in the
/// `board_members` join table. The owner is never a member row; ownership
/// alone grants full rights. Deleting a board cascades to its tasks (and
/// through them to comments) at the schema level.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Board model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID (UUID v4)
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owning user; set at creation and never changed
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Board title
    pub title: String,

    /// Owner (the creating user)
    pub owner_id: Uuid,

    /// Initial membership set; the caller must have resolved these to
    /// existing users already
    pub member_ids: Vec<Uuid>,
}

/// Input for partially updating a board
///
/// Outer `None` leaves a field untouched. An empty member list clears the
/// membership set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoard {
    /// New title
    pub title: Option<String>,

    /// New membership set (full replace)
    pub member_ids: Option<Vec<Uuid>>,
}

/// Board summary with aggregate task statistics
///
/// One row per board on the list endpoint and on create responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Number of member rows (the owner is not counted)
    pub member_count: i64,

    /// Total number of tasks on the board
    pub ticket_count: i64,

    /// Number of tasks still in `to-do`
    pub tasks_to_do_count: i64,

    /// Number of high-priority tasks
    pub tasks_high_prio_count: i64,

    /// Owning user ID
    pub owner_id: Uuid,
}

const SUMMARY_COLUMNS: &str = r#"
    b.id,
    b.title,
    (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.status = 'to-do') AS tasks_to_do_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.priority = 'high') AS tasks_high_prio_count,
    b.owner_id
"#;

impl Board {
    /// Creates a board and its initial membership set in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the owner or a member ID violates a foreign key,
    /// or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at
            "#,
        )
        .bind(&data.title)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        if !data.member_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO board_members (board_id, user_id)
                SELECT $1, user_id FROM UNNEST($2::uuid[]) AS t(user_id)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(board.id)
            .bind(&data.member_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(board)
    }

    /// Finds a board by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, owner_id, created_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists boards visible to a user, most recently created first
    ///
    /// A board is visible when the user is its owner or appears in its
    /// membership set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<BoardSummary>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM boards b
            WHERE b.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM board_members m
                   WHERE m.board_id = b.id AND m.user_id = $1
               )
            ORDER BY b.created_at DESC
            "#
        );

        let boards = sqlx::query_as::<_, BoardSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(boards)
    }

    /// Fetches the summary (with task statistics) for a single board
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn summary(pool: &PgPool, id: Uuid) -> Result<Option<BoardSummary>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM boards b
            WHERE b.id = $1
            "#
        );

        let summary = sqlx::query_as::<_, BoardSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(summary)
    }

    /// Partially updates a board in one transaction
    ///
    /// Title and membership set change together or not at all. Members are
    /// full-replace: the previous set is discarded and the given IDs become
    /// the new membership, an empty list clears the set. The owner is
    /// filtered out since ownership already grants access. Returns None when
    /// the board does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a member ID violates a foreign key or the
    /// database is unreachable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = match &data.title {
            Some(title) => {
                sqlx::query_as::<_, Board>(
                    r#"
                    UPDATE boards
                    SET title = $2
                    WHERE id = $1
                    RETURNING id, title, owner_id, created_at
                    "#,
                )
                .bind(id)
                .bind(title)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Board>(
                    r#"
                    SELECT id, title, owner_id, created_at
                    FROM boards
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let Some(board) = board else {
            return Ok(None);
        };

        if let Some(member_ids) = &data.member_ids {
            let member_ids: Vec<Uuid> = member_ids
                .iter()
                .copied()
                .filter(|user_id| *user_id != board.owner_id)
                .collect();

            sqlx::query("DELETE FROM board_members WHERE board_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if !member_ids.is_empty() {
                sqlx::query(
                    r#"
                    INSERT INTO board_members (board_id, user_id)
                    SELECT $1, user_id FROM UNNEST($2::uuid[]) AS t(user_id)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(id)
                .bind(&member_ids)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(Some(board))
    }

    /// Lists the members of a board as user summaries
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn members(pool: &PgPool, board_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error> {
        let members = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.full_name
            FROM board_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.board_id = $1
            ORDER BY u.full_name
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Deletes a board
    ///
    /// Tasks on the board and their comments are removed by the schema
    /// cascades.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_board_struct() {
        let owner = Uuid::new_v4();
        let create = CreateBoard {
            title: "Sprint 1".to_string(),
            owner_id: owner,
            member_ids: vec![Uuid::new_v4()],
        };

        assert_eq!(create.title, "Sprint 1");
        assert_eq!(create.owner_id, owner);
        assert_eq!(create.member_ids.len(), 1);
    }

    #[test]
    fn test_board_summary_serialization() {
        let summary = BoardSummary {
            id: Uuid::new_v4(),
            title: "Sprint 1".to_string(),
            member_count: 2,
            ticket_count: 5,
            tasks_to_do_count: 3,
            tasks_high_prio_count: 1,
            owner_id: Uuid::new_v4(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["ticket_count"], 5);
        assert_eq!(json["tasks_to_do_count"], 3);
        assert_eq!(json["tasks_high_prio_count"], 1);
    }
}
