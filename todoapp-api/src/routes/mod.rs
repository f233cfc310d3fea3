/// API route handlers
///
/// - `health`: Banner and health check
/// - `users`: Registration, login and the caller's own profile
/// - `tasks`: CRUD on the caller's tasks

pub mod health;
pub mod tasks;
pub mod users;
