/// PostgreSQL store backed by a `sqlx` pool
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todoapp_shared::db::pool::{create_pool, DatabaseConfig};
/// use todoapp_shared::store::{PgStore, TaskStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// }).await?;
///
/// let store = Arc::new(PgStore::new(pool));
/// let users: Arc<dyn UserStore> = store.clone();
/// let tasks: Arc<dyn TaskStore> = store;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    task::{NewTask, Task, TaskPatch},
    user::{NewUser, User, UserPatch},
};

/// Store implementation over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for health checks and migrations
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// PostgreSQL `string_data_right_truncation`
const VALUE_TOO_LONG: &str = "22001";

/// Maps constraint failures on writes to typed store errors
///
/// The only unique constraint is `users.email` and the only foreign key is
/// `tasks.user_id`.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::UnknownUser;
        }
        if db_err.code().as_deref() == Some(VALUE_TOO_LONG) {
            return StoreError::ValueTooLong;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(map_write_error)
    }

    async fn update(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>> {
        User::update(&self.pool, id, patch)
            .await
            .map_err(map_write_error)
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create(&self, data: NewTask) -> StoreResult<Task> {
        Task::create(&self.pool, data).await.map_err(map_write_error)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_by_user(&self, user_id: i32) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_user(&self.pool, user_id).await?)
    }

    async fn update(&self, id: i32, patch: TaskPatch) -> StoreResult<Option<Task>> {
        Task::update(&self.pool, id, patch)
            .await
            .map_err(map_write_error)
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_database_errors() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
