/// API route handlers
///
/// One module per resource; every handler is an explicit {resource, action}
/// entry that names its own authorization check and response shape:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `boards`: Board CRUD and the email-check lookup
/// - `tasks`: Task CRUD plus the assigned-to-me/reviewing listings
/// - `comments`: Comments nested under tasks

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;
