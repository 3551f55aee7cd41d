/// Database models for KanMind
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with credentials and display name
/// - `board`: Kanban boards with an owner and a membership set
/// - `task`: Tasks on a board with status, priority, assignee and reviewer
/// - `comment`: Comments attached to tasks
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::models::user::{CreateUser, User};
/// use kanmind_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "user@example.com".to_string(),
///         full_name: "Jane Doe".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod comment;
pub mod task;
pub mod user;
