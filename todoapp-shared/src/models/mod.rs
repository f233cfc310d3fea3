/// Database models for the Todo App
///
/// Each model owns its SQL: associated functions take a `&PgPool` and return
/// `sqlx::Error` on failure. Request handlers reach them through the traits
/// in [`crate::store`].
///
/// # Models
///
/// - `user`: User accounts, credentials and the public profile projection
/// - `task`: Todo items owned by a user

pub mod task;
pub mod user;
