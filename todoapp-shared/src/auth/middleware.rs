/// Authentication middleware for Axum
///
/// The auth gate runs before every protected handler:
///
/// ```text
/// NoToken -> ExtractToken -> VerifyToken -> { Authorized, Rejected }
/// ```
///
/// - No `Authorization` header, or one not using the `Bearer ` scheme:
///   401 "Accès non autorisé. Token manquant."
/// - Token fails verification for any reason (malformed, bad signature,
///   expired): 401 "Accès non autorisé. Token invalide."
/// - Otherwise an [`AuthContext`] is inserted into the request extensions and
///   the next handler runs.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use todoapp_shared::auth::jwt::TokenService;
/// use todoapp_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = Arc::new(TokenService::new("your-jwt-secret")?);
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{TokenService, VerificationError};

/// Authorization scheme prefix expected in the header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated identity for the current request
///
/// Lives in the request extensions and is dropped with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i32,
}

impl AuthContext {
    /// Creates auth context for a verified user
    pub fn new(user_id: i32) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Missing header or not a Bearer credential
    #[error("Accès non autorisé. Token manquant.")]
    MissingToken,

    /// Token failed verification
    #[error("Accès non autorisé. Token invalide.")]
    InvalidToken(VerificationError),

    /// Handler reached without passing through the gate
    #[error("Non autorisé")]
    MissingContext,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": self.to_string() })),
        )
            .into_response()
    }
}

/// Pulls the bearer token out of an `Authorization` header value
pub fn extract_bearer(header_value: Option<&str>) -> Result<&str, AuthError> {
    header_value
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::MissingToken)
}

/// Runs the full gate decision for a header value
pub fn authenticate(
    tokens: &TokenService,
    header_value: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let token = extract_bearer(header_value)?;
    let claims = tokens.verify(token).map_err(AuthError::InvalidToken)?;

    Ok(AuthContext::new(claims.user_id))
}

/// JWT authentication middleware
///
/// Use with `axum::middleware::from_fn_with_state`, passing the shared
/// [`TokenService`].
pub async fn jwt_auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = authenticate(&tokens, header_value).map_err(|e| {
        if let AuthError::InvalidToken(reason) = &e {
            tracing::debug!(%reason, "Rejected bearer token");
        }
        e
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingContext)
    }
}
