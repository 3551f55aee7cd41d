/// Task model and database operations
///
/// Tasks belong to exactly one board; the board reference is immutable after
/// creation, which is enforced at the API layer (the update builder here has
/// no way to change it). Assignee and reviewer are optional references to
/// users and must be the board owner or a board member at validation time.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to-do', 'in-progress', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'to-do',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserSummary;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet (the default)
    ToDo,

    /// Being worked on
    InProgress,

    /// Waiting for the reviewer
    Review,

    /// Finished
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Board this task belongs to; immutable after creation
    pub board_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// User responsible for completing the task
    pub assignee_id: Option<Uuid>,

    /// User responsible for reviewing the task
    pub reviewer_id: Option<Uuid>,

    /// Optional deadline
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Target board
    pub board_id: Uuid,

    /// Task title
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

/// Input for partially updating a task
///
/// Outer `None` leaves a field untouched; for the nullable fields an inner
/// `None` clears the stored value. The board reference is deliberately not
/// representable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee (use Some(None) to clear)
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer (use Some(None) to clear)
    pub reviewer_id: Option<Option<Uuid>>,

    /// New deadline (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,
}

/// Task with embedded assignee/reviewer summaries and comment count
///
/// This is the shape the API serializes on list, retrieve and create
/// responses. `comments_count` is omitted from update responses, which is
/// why it is optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    /// Task ID
    pub id: Uuid,

    /// Board the task belongs to
    pub board: Uuid,

    /// Task title
    pub title: String,

    /// Description; serialized as `null` when unset
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Assignee details, if assigned
    pub assignee: Option<UserSummary>,

    /// Reviewer details, if set
    pub reviewer: Option<UserSummary>,

    /// Optional deadline
    pub due_date: Option<NaiveDate>,

    /// Number of comments; omitted on update responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<i64>,
}

/// Flat row for the joined task view query
#[derive(Debug, sqlx::FromRow)]
struct TaskViewRow {
    id: Uuid,
    board_id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    assignee_id: Option<Uuid>,
    assignee_email: Option<String>,
    assignee_full_name: Option<String>,
    reviewer_id: Option<Uuid>,
    reviewer_email: Option<String>,
    reviewer_full_name: Option<String>,
    due_date: Option<NaiveDate>,
    comments_count: i64,
}

impl From<TaskViewRow> for TaskView {
    fn from(row: TaskViewRow) -> Self {
        let assignee = match (row.assignee_id, row.assignee_email, row.assignee_full_name) {
            (Some(id), Some(email), Some(fullname)) => Some(UserSummary {
                id,
                email,
                fullname,
            }),
            _ => None,
        };
        let reviewer = match (row.reviewer_id, row.reviewer_email, row.reviewer_full_name) {
            (Some(id), Some(email), Some(fullname)) => Some(UserSummary {
                id,
                email,
                fullname,
            }),
            _ => None,
        };

        TaskView {
            id: row.id,
            board: row.board_id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            assignee,
            reviewer,
            due_date: row.due_date,
            comments_count: Some(row.comments_count),
        }
    }
}

const VIEW_QUERY: &str = r#"
    SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority,
           t.assignee_id, au.email AS assignee_email, au.full_name AS assignee_full_name,
           t.reviewer_id, ru.email AS reviewer_email, ru.full_name AS reviewer_full_name,
           t.due_date,
           (SELECT COUNT(*) FROM task_comments c WHERE c.task_id = t.id) AS comments_count
    FROM tasks t
    LEFT JOIN users au ON au.id = t.assignee_id
    LEFT JOIN users ru ON ru.id = t.reviewer_id
"#;

impl Task {
    /// Creates a new task
    ///
    /// Assignee/reviewer membership must have been validated by the caller;
    /// this method only persists.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced row is missing (foreign key) or the
    /// database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (board_id, title, description, status, priority,
                               assignee_id, reviewer_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, board_id, title, description, status, priority,
                      assignee_id, reviewer_id, due_date, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.assignee_id)
        .bind(data.reviewer_id)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, status, priority,
                   assignee_id, reviewer_id, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Partially updates a task
    ///
    /// Builds the UPDATE from the fields that are present so that untouched
    /// columns keep their values. Returns None when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced user is missing (foreign key) or the
    /// database is unreachable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }
        if data.reviewer_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", reviewer_id = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, board_id, title, description, status, priority, \
             assignee_id, reviewer_id, due_date, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(reviewer_id) = data.reviewer_id {
            q = q.bind(reviewer_id);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Comments on the task are removed by the schema cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches the joined view of a single task
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn view(pool: &PgPool, id: Uuid) -> Result<Option<TaskView>, sqlx::Error> {
        let query = format!("{VIEW_QUERY} WHERE t.id = $1");

        let row = sqlx::query_as::<_, TaskViewRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskView::from))
    }

    /// Lists the joined views of all tasks on a board, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn views_by_board(
        pool: &PgPool,
        board_id: Uuid,
    ) -> Result<Vec<TaskView>, sqlx::Error> {
        let query = format!("{VIEW_QUERY} WHERE t.board_id = $1 ORDER BY t.created_at DESC");

        let rows = sqlx::query_as::<_, TaskViewRow>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskView::from).collect())
    }

    /// Lists tasks where the user is the assignee, across all boards
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn views_by_assignee(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskView>, sqlx::Error> {
        let query = format!("{VIEW_QUERY} WHERE t.assignee_id = $1 ORDER BY t.created_at DESC");

        let rows = sqlx::query_as::<_, TaskViewRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskView::from).collect())
    }

    /// Lists tasks where the user is the reviewer, across all boards
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn views_by_reviewer(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskView>, sqlx::Error> {
        let query = format!("{VIEW_QUERY} WHERE t.reviewer_id = $1 ORDER BY t.created_at DESC");

        let rows = sqlx::query_as::<_, TaskViewRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(TaskView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::ToDo);
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskStatus::ToDo).unwrap(),
            serde_json::json!("to-do")
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("in-progress")
        );
        let parsed: TaskStatus = serde_json::from_str("\"review\"").unwrap();
        assert_eq!(parsed, TaskStatus::Review);
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskPriority::High).unwrap(),
            serde_json::json!("high")
        );
        let parsed: TaskPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, TaskPriority::Low);
    }

    #[test]
    fn test_update_task_default_touches_nothing() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.status.is_none());
        assert!(update.priority.is_none());
        assert!(update.assignee_id.is_none());
        assert!(update.reviewer_id.is_none());
        assert!(update.due_date.is_none());
    }

    #[test]
    fn test_task_view_omits_absent_comment_count() {
        let view = TaskView {
            id: Uuid::new_v4(),
            board: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: None,
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assignee: None,
            reviewer: None,
            due_date: None,
            comments_count: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("comments_count").is_none());

        let with_count = TaskView {
            comments_count: Some(3),
            ..view
        };
        let json = serde_json::to_value(&with_count).unwrap();
        assert_eq!(json["comments_count"], 3);
    }
}
