/// Task comment model and database operations
///
/// Comments are immutable after creation; the only write operations are
/// create and delete, and deletion is reserved for the author.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID (UUID v4)
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Authoring user
    pub author_id: Uuid,

    /// Comment text; non-empty after trimming
    pub content: String,

    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's display name
///
/// This is the serialized shape on the comment endpoints: `author` carries
/// the fullname rather than a nested user object.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    /// Comment ID
    pub id: Uuid,

    /// Author's display name
    pub author: String,

    /// Comment text
    pub content: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment on a task
    ///
    /// The timestamp is assigned by the database at insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the task or author row is missing (foreign key)
    /// or the database is unreachable.
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO task_comments (task_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, content, created_at
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM task_comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists the comments of a task, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, u.full_name AS author, c.content, c.created_at
            FROM task_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
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
    fn test_comment_view_serialization() {
        let view = CommentView {
            id: Uuid::new_v4(),
            author: "Jane Doe".to_string(),
            content: "Looks good".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["author"], "Jane Doe");
        assert_eq!(json["content"], "Looks good");
        assert!(json.get("author_id").is_none());
    }
}
