/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: bcrypt password hashing and verification
/// - [`jwt`]: JWT token issuance and verification
/// - [`middleware`]: Axum auth gate and the [`middleware::AuthContext`] extractor
/// - [`authorization`]: Resource ownership guard
///
/// # Example
///
/// ```no_run
/// use todoapp_shared::auth::password::{hash_password, verify_password};
/// use todoapp_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// // Token for the authenticated user
/// let tokens = TokenService::new("your-secret-key")?;
/// let token = tokens.issue(1)?;
/// let claims = tokens.verify(&token)?;
/// assert_eq!(claims.user_id, 1);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
