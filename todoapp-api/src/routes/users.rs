/// User endpoints
///
/// - `POST /api/users/register` - Create an account and get a token
/// - `POST /api/users/login` - Exchange credentials for a token
/// - `GET /api/users/profile` - Caller's profile (authenticated)
/// - `PUT /api/users/profile` - Update caller's profile (authenticated)
/// - `DELETE /api/users/account` - Delete caller's account and tasks (authenticated)

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use todoapp_shared::{
    auth::{
        middleware::AuthContext,
        password::{hash_password_async, verify_dummy_async, verify_password_async},
    },
    models::user::{NewUser, PublicUser, UserPatch},
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FIELD_TOO_LONG},
    extract::ApiJson,
};

const EMAIL_TAKEN: &str = "Cet email est déjà utilisé";
const BAD_CREDENTIALS: &str = "Email ou mot de passe incorrect";
const USER_NOT_FOUND: &str = "Utilisateur non trouvé";

/// Register request
///
/// Fields are optional at the serde level so that absent, `null` and empty
/// all fail validation with the same message. Upper bounds match the
/// column widths.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(required, length(min = 1, max = 100))]
    pub nom: Option<String>,

    #[validate(required, length(min = 1, max = 100))]
    pub prenom: Option<String>,

    #[validate(required, length(min = 1, max = 255))]
    pub email: Option<String>,

    #[validate(required, length(min = 1, max = 255))]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(required, length(min = 1, max = 255))]
    pub email: Option<String>,

    #[validate(required, length(min = 1, max = 255))]
    pub password: Option<String>,
}

/// Profile update request; absent or empty fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub nom: Option<String>,

    #[validate(length(max = 100))]
    pub prenom: Option<String>,

    #[validate(length(max = 255))]
    pub email: Option<String>,

    #[validate(length(max = 255))]
    pub password: Option<String>,
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Registers a new user
///
/// # Errors
///
/// - `400 Bad Request`: a field is missing, null, empty or too long, or the
///   email is taken
/// - `500 Internal Server Error`: store or hashing failure
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()
        .map_err(|_| ApiError::BadRequest("Tous les champs sont requis".to_string()))?;
    let RegisterRequest {
        nom: Some(nom),
        prenom: Some(prenom),
        email: Some(email),
        password: Some(password),
    } = req
    else {
        return Err(ApiError::BadRequest("Tous les champs sont requis".to_string()));
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password_async(password).await?;

    // A concurrent registration can still win the race; the store reports it
    // as DuplicateEmail, which maps to the same 400.
    let user = state
        .users
        .create(NewUser {
            nom,
            prenom,
            email,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Utilisateur créé avec succès".to_string(),
            user: user.into(),
            token,
        }),
    ))
}

/// Authenticates a user by email and password
///
/// Unknown email and wrong password give the same response.
///
/// # Errors
///
/// - `400 Bad Request`: email or password missing, null or too long
/// - `401 Unauthorized`: bad credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()
        .map_err(|_| ApiError::BadRequest("Email et mot de passe requis".to_string()))?;
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::BadRequest("Email et mot de passe requis".to_string()));
    };

    let Some(user) = state.users.find_by_email(&email).await? else {
        tracing::debug!("Login attempt for unknown email");
        verify_dummy_async(password).await;
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    if !verify_password_async(password, user.password_hash.clone()).await {
        tracing::debug!(user_id = user.id, "Login attempt with wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Connexion réussie".to_string(),
        user: user.into(),
        token,
    }))
}

/// Returns the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(ProfileResponse { user: user.into() }))
}

/// Updates the caller's profile
///
/// A new password is re-hashed. Changing the email to one owned by another
/// account is rejected.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    req.validate()
        .map_err(|_| ApiError::BadRequest(FIELD_TOO_LONG.to_string()))?;

    let current = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    let email = non_empty(req.email);
    if let Some(email) = email.as_deref().filter(|e| *e != current.email) {
        if let Some(owner) = state.users.find_by_email(email).await? {
            if owner.id != current.id {
                return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
            }
        }
    }

    let password_hash = match non_empty(req.password) {
        Some(password) => Some(hash_password_async(password).await?),
        None => None,
    };

    let patch = UserPatch {
        nom: non_empty(req.nom),
        prenom: non_empty(req.prenom),
        email,
        password_hash,
    };

    let user = state
        .users
        .update(current.id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(ProfileUpdatedResponse {
        message: "Profil mis à jour avec succès".to_string(),
        user: user.into(),
    }))
}

/// Deletes the caller's account; their tasks go with it
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<MessageResponse>> {
    if !state.users.delete(auth.user_id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = auth.user_id, "Account deleted");

    Ok(Json(MessageResponse {
        message: "Compte supprimé avec succès".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_missing_fields_fail_validation() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"nom":"Dupont","email":"jean@example.com"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: RegisterRequest = serde_json::from_str(
            r#"{"nom":"Dupont","prenom":"Jean","email":"jean@example.com","password":"secret"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_null_and_oversized_fail_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"nom":null,"prenom":"Jean","email":"jean@example.com","password":"secret"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            nom: Some("n".repeat(101)),
            prenom: Some("Jean".to_string()),
            email: Some("jean@example.com".to_string()),
            password: Some("secret".to_string()),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            nom: Some("n".repeat(100)),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_empty_password_fails_validation() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"jean@example.com","password":""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"jean@example.com","password":null}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_profile_update_bounds_only_supplied_fields() {
        assert!(UpdateProfileRequest::default().validate().is_ok());

        let req = UpdateProfileRequest {
            email: Some(format!("{}@example.com", "a".repeat(250))),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("Paul".to_string())), Some("Paul".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
