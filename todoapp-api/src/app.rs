/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todoapp_api::{app::{build_router, AppState}, config::Config};
/// use todoapp_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store = Arc::new(MemoryStore::new());
/// let state = AppState::new(config, store.clone(), store)?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3002").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use todoapp_shared::{
    auth::{jwt::TokenService, middleware::jwt_auth_middleware},
    store::{TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes,
};

/// Shared application state
///
/// Cloned into every handler; all fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,

    /// Token issuer/verifier built from `JWT_SECRET`
    pub tokens: Arc<TokenService>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state
    ///
    /// # Errors
    ///
    /// Fails if the configured JWT secret is empty.
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.jwt.secret)?;

        Ok(Self {
            users,
            tasks,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        })
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET  /                     # Banner (public)
/// ├── GET  /health               # Health check (public)
/// ├── /api/users/
/// │   ├── POST   /register       # public
/// │   ├── POST   /login          # public
/// │   ├── GET    /profile        # authenticated
/// │   ├── PUT    /profile        # authenticated
/// │   └── DELETE /account        # authenticated
/// └── /api/tasks/                # all authenticated
///     ├── GET    /
///     ├── POST   /
///     ├── GET    /:id
///     ├── PUT    /:id
///     └── DELETE /:id
/// ```
///
/// Anything else is a 404 with a `{message}` body.
pub fn build_router(state: AppState) -> Router {
    let auth = from_fn_with_state(state.tokens.clone(), jwt_auth_middleware);

    let account_routes = Router::new()
        .route(
            "/profile",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route("/account", delete(routes::users::delete_account))
        .route_layer(auth.clone());

    let user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .merge(account_routes);

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(auth);

    let cors = cors_layer(&state.config.api.cors_origins);
    let production = state.config.api.production;

    Router::new()
        .route("/", get(routes::health::banner))
        .route("/health", get(routes::health::health_check))
        .nest("/api/users", user_routes)
        .nest("/api/tasks", task_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// Unmatched paths get the same `{message}` body as every other error
async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route non trouvée".to_string())
}

/// Permissive CORS when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
