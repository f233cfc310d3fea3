/// Task model and database operations
///
/// Tasks are the todo items of a single user. `user_id` is the owner and is
/// the only identity allowed to see or change the task.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::models::task::{NewTask, Task, TaskPatch};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i32) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, NewTask {
///     title: "Faire les courses".to_string(),
///     description: None,
///     completed: false,
///     user_id,
/// }).await?;
///
/// Task::update(&pool, task.id, TaskPatch {
///     completed: Some(true),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::auth::authorization::OwnedResource;

const TASK_COLUMNS: &str = "id, title, description, completed, user_id, created_at, updated_at";

/// Width of `tasks.title`, in characters
pub const TITLE_MAX_LEN: usize = 255;

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i32,

    pub title: String,

    pub description: Option<String>,

    pub completed: bool,

    /// Owning user
    pub user_id: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Task {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: i32,
}

/// Fields that may change on an existing task
///
/// `description: Some(None)` clears the description. Ownership is not part
/// of the patch and cannot be transferred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, completed, user_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed)
        .bind(data.user_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by ID regardless of owner
    ///
    /// Callers serving a user must pass the result through the ownership guard.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a user's tasks, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a patch and refreshes `updated_at`
    ///
    /// # Returns
    ///
    /// The updated task, or None if the task doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = patch.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(completed) = patch.completed {
            builder.push(", completed = ").push_bind(completed);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        builder.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Deletes a task
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
