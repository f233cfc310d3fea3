/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     nom VARCHAR(100) NOT NULL,
///     prenom VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The `password` column holds a bcrypt hash. [`User`] deliberately does not
/// implement `Serialize`; responses go through [`PublicUser`].
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::models::user::{NewUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, NewUser {
///     nom: "Dupont".to_string(),
///     prenom: "Jean".to_string(),
///     email: "jean@example.com".to_string(),
///     password_hash: "$2b$10$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "jean@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

const USER_COLUMNS: &str = "id, nom, prenom, email, password, created_at";

/// Width of `users.nom` and `users.prenom`, in characters
pub const NAME_MAX_LEN: usize = 100;

/// Width of `users.email`
pub const EMAIL_MAX_LEN: usize = 255;

/// User account row, including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i32,

    /// Last name
    pub nom: String,

    /// First name
    pub prenom: String,

    /// Email address, unique across users
    pub email: String,

    /// bcrypt hash of the password
    #[sqlx(rename = "password")]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Public profile projection returned by every user-facing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nom: user.nom.clone(),
            prenom: user.prenom.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nom: user.nom,
            prenom: user.prenom,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub nom: String,
    pub prenom: String,
    pub email: String,

    /// bcrypt hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Fields a user may change on their own profile
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,

    /// New bcrypt hash
    pub password_hash: Option<String>,
}

impl UserPatch {
    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.nom.is_none()
            && self.prenom.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the email is already registered.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (nom, prenom, email, password) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(data.nom)
        .bind(data.prenom)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by exact email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Applies a profile patch
    ///
    /// Every value is sent as a bound parameter. An empty patch performs no
    /// write and returns the current row.
    ///
    /// # Returns
    ///
    /// The updated user, or None if the user doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        patch: UserPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        if patch.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut fields = builder.separated(", ");

        if let Some(nom) = patch.nom {
            fields.push("nom = ").push_bind_unseparated(nom);
        }
        if let Some(prenom) = patch.prenom {
            fields.push("prenom = ").push_bind_unseparated(prenom);
        }
        if let Some(email) = patch.email {
            fields.push("email = ").push_bind_unseparated(email);
        }
        if let Some(password_hash) = patch.password_hash {
            fields.push("password = ").push_bind_unseparated(password_hash);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        builder.build_query_as::<User>().fetch_optional(pool).await
    }

    /// Deletes a user; their tasks are removed by `ON DELETE CASCADE`
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
