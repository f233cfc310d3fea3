/// Persistence traits used by request handlers
///
/// Handlers never talk to `sqlx` directly. They receive `Arc<dyn UserStore>`
/// and `Arc<dyn TaskStore>` through application state, which keeps the auth
/// and ownership logic testable without a database.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via the model queries
/// - [`memory::MemoryStore`]: In-process maps for tests and demos

use async_trait::async_trait;

use crate::models::{
    task::{NewTask, Task, TaskPatch},
    user::{NewUser, User, UserPatch},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Email already registered to another user
    #[error("Email already exists")]
    DuplicateEmail,

    /// Task owner does not exist (foreign key on `tasks.user_id`)
    #[error("Owner does not exist")]
    UnknownUser,

    /// A value exceeds its column width
    #[error("Value too long for column")]
    ValueTooLong,

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up the credential record for an email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<User>>;

    /// Inserts a user; `DuplicateEmail` if the email is taken
    async fn create(&self, data: NewUser) -> StoreResult<User>;

    /// Applies a patch; None if the user doesn't exist
    async fn update(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>>;

    /// Deletes a user and their tasks
    async fn delete(&self, id: i32) -> StoreResult<bool>;

    /// Checks that the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task; `UnknownUser` if the owner doesn't exist
    async fn create(&self, data: NewTask) -> StoreResult<Task>;

    /// Looks up a task by id without any ownership filter
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Task>>;

    /// All tasks of one user, newest first
    async fn list_by_user(&self, user_id: i32) -> StoreResult<Vec<Task>>;

    async fn update(&self, id: i32, patch: TaskPatch) -> StoreResult<Option<Task>>;

    async fn delete(&self, id: i32) -> StoreResult<bool>;
}
