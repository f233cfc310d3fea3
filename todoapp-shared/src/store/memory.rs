/// In-memory store for tests and demos
///
/// Mirrors the PostgreSQL behaviour that handlers depend on:
/// - serial ids starting at 1
/// - unique emails (`DuplicateEmail`)
/// - column widths (`ValueTooLong`)
/// - tasks must belong to an existing user (`UnknownUser`)
/// - deleting a user deletes their tasks
/// - task listings newest first
///
/// [`MemoryStore::set_unavailable`] makes every call fail as if the
/// database were down.
///
/// # Example
///
/// ```
/// use todoapp_shared::models::user::NewUser;
/// use todoapp_shared::store::{MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = UserStore::create(&store, NewUser {
///     nom: "Dupont".to_string(),
///     prenom: "Jean".to_string(),
///     email: "jean@example.com".to_string(),
///     password_hash: "hash".to_string(),
/// }).await?;
/// assert_eq!(user.id, 1);
/// # Ok(())
/// # }
/// ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{
    task::{NewTask, Task, TaskPatch, TITLE_MAX_LEN},
    user::{NewUser, User, UserPatch, EMAIL_MAX_LEN, NAME_MAX_LEN},
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: i32,
    last_task_id: i32,
}

/// Store implementation over in-process maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a database outage for every subsequent call
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored tasks across all users
    pub fn task_count(&self) -> usize {
        self.lock().map(|t| t.tasks.len()).unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Database(sqlx::Error::PoolClosed))
    }
}

fn check_width(value: Option<&str>, max: usize) -> StoreResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(StoreError::ValueTooLong),
        _ => Ok(()),
    }
}

fn check_user_widths(nom: Option<&str>, prenom: Option<&str>, email: Option<&str>) -> StoreResult<()> {
    check_width(nom, NAME_MAX_LEN)?;
    check_width(prenom, NAME_MAX_LEN)?;
    check_width(email, EMAIL_MAX_LEN)
}

fn email_taken(tables: &Tables, email: &str, except_id: Option<i32>) -> bool {
    tables
        .users
        .values()
        .any(|u| u.email == email && Some(u.id) != except_id)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        let mut tables = self.lock()?;
        check_user_widths(Some(&data.nom), Some(&data.prenom), Some(&data.email))?;
        if email_taken(&tables, &data.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            nom: data.nom,
            prenom: data.prenom,
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut tables = self.lock()?;
        check_user_widths(
            patch.nom.as_deref(),
            patch.prenom.as_deref(),
            patch.email.as_deref(),
        )?;
        if let Some(email) = &patch.email {
            if email_taken(&tables, email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(nom) = patch.nom {
            user.nom = nom;
        }
        if let Some(prenom) = patch.prenom {
            user.prenom = prenom;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.tasks.retain(|_, task| task.user_id != id);
        }

        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, data: NewTask) -> StoreResult<Task> {
        let mut tables = self.lock()?;
        check_width(Some(&data.title), TITLE_MAX_LEN)?;
        if !tables.users.contains_key(&data.user_id) {
            return Err(StoreError::UnknownUser);
        }

        tables.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.last_task_id,
            title: data.title,
            description: data.description,
            completed: data.completed,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Task>> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: i32) -> StoreResult<Vec<Task>> {
        let tables = self.lock()?;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(tasks)
    }

    async fn update(&self, id: i32, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let mut tables = self.lock()?;
        check_width(patch.title.as_deref(), TITLE_MAX_LEN)?;
        let Some(task) = tables.tasks.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        Ok(self.lock()?.tasks.remove(&id).is_some())
    }
}
