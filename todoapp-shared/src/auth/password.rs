/// Password hashing module using bcrypt
///
/// Passwords are stored as bcrypt hashes with a fresh random salt per call,
/// so hashing the same password twice never yields the same stored value.
///
/// # Security
///
/// - **Algorithm**: bcrypt (`$2b$` modular crypt format)
/// - **Cost**: 10 (2^10 key expansion rounds)
/// - **Salt**: 16 random bytes, embedded in the hash string
///
/// bcrypt is CPU-bound. Request handlers should use the `_async` variants,
/// which move the work onto Tokio's blocking thread pool.
///
/// # Example
///
/// ```
/// use todoapp_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret123")?;
///
/// assert!(verify_password("secret123", &hash));
/// assert!(!verify_password("wrong", &hash));
/// # Ok(())
/// # }
/// ```

use std::sync::OnceLock;

/// bcrypt cost factor used for every stored password
pub const HASH_COST: u32 = 10;

/// Hash compared against when no account matches, so unknown and known
/// emails cost the same bcrypt work
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| hash_password("todoapp-dummy-password").unwrap_or_default())
}

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The blocking hashing task did not complete
    #[error("Password task failed: {0}")]
    TaskFailed(String),
}

/// Hashes a password with bcrypt at [`HASH_COST`]
///
/// # Returns
///
/// Modular crypt string, e.g. `$2b$10$<22 char salt><31 char hash>`
///
/// # Errors
///
/// Returns `PasswordError::HashError` if bcrypt rejects the input
/// (for example a password containing a NUL byte).
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, HASH_COST).map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored bcrypt hash
///
/// Fails closed: a mismatch, a malformed hash or any bcrypt error all
/// return `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Hashes a password on the blocking thread pool
pub async fn hash_password_async(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}

/// Verifies a password on the blocking thread pool
///
/// A panicked or cancelled verification task counts as a mismatch.
pub async fn verify_password_async(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

/// Spends one verification on a fixed hash and always returns `false`
///
/// Login calls this when the email is unknown, so the response time does
/// not reveal whether an account exists.
pub async fn verify_dummy_async(password: String) -> bool {
    tokio::task::spawn_blocking(move || {
        verify_password(&password, dummy_hash());
        false
    })
    .await
    .unwrap_or(false)
}
