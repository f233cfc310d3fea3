/// JWT token generation and validation module
///
/// Tokens are signed with HS256 and carry a single identity claim, `userId`,
/// plus the registered `iat`/`exp` claims. They are never stored server-side:
/// a token stays valid until its `exp` passes.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256), no other algorithm accepted
/// - **Expiration**: 24 hours from issuance, validated with zero leeway
/// - **Secret**: required at construction; an empty secret is a configuration error
///
/// # Example
///
/// ```
/// use todoapp_shared::auth::jwt::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes")?;
///
/// let token = tokens.issue(42)?;
/// let claims = tokens.verify(&token)?;
/// assert_eq!(claims.user_id, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime of every issued token
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Error type for token issuance
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// No signing secret configured
    #[error("JWT signing secret is not configured")]
    MissingSecret,

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),
}

/// Why a presented token was rejected
///
/// Callers must not reveal which variant occurred; the auth gate maps all of
/// them to the same 401 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// Not a decodable JWT, wrong algorithm, or claims of the wrong shape
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the server secret
    #[error("bad token signature")]
    BadSignature,

    /// `exp` is in the past
    #[error("token expired")]
    Expired,
}

/// JWT claims structure
///
/// Serialized as `{"userId": 1, "iat": ..., "exp": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user ID
    #[serde(rename = "userId")]
    pub user_id: i32,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring [`TOKEN_TTL_HOURS`] from now
    pub fn new(user_id: i32) -> Self {
        Self::with_expiration(user_id, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration yields claims that are already expired.
    pub fn with_expiration(user_id: i32, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Issues and verifies bearer tokens with a server-held secret
///
/// Immutable after construction, so one instance is shared by all requests.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service from the signing secret
    ///
    /// # Errors
    ///
    /// Returns `JwtError::MissingSecret` if the secret is empty. This is a
    /// startup failure, never a per-request one.
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issues a 24-hour token for a user
    pub fn issue(&self, user_id: i32) -> Result<String, JwtError> {
        self.issue_claims(&Claims::new(user_id))
    }

    /// Signs arbitrary claims
    pub fn issue_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token's signature and expiry and returns its claims
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                ErrorKind::InvalidSignature => VerificationError::BadSignature,
                _ => VerificationError::Malformed,
            })
    }
}
