/// Configuration management for the API server
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `JWT_SECRET`: Secret key for token signing (required, non-empty)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 3002)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `CORS_ORIGINS`: Comma separated allowed origins, `*` for any (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
/// - `RUST_LOG`: Log filter
///
/// A `.env` file in the working directory is loaded first when present.
///
/// # Example
///
/// ```no_run
/// use todoapp_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use anyhow::Context;

/// Minimum secret length before a startup warning is logged
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,

    /// Production mode adds `Strict-Transport-Security`
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    pub secret: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig").field("secret", &"<redacted>").finish()
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Fails if a required variable is missing, `JWT_SECRET` is empty, or a
    /// numeric/boolean variable cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3002".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let url = lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let secret = lookup("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = secret.len(),
                "JWT_SECRET is shorter than {} characters",
                RECOMMENDED_SECRET_LEN
            );
        }

        let cors_origins = parse_origins(lookup("CORS_ORIGINS").as_deref().unwrap_or("*"));
        let production = parse_flag(lookup("PRODUCTION"), false).context("PRODUCTION must be true or false")?;
        let run_migrations =
            parse_flag(lookup("RUN_MIGRATIONS"), true).context("RUN_MIGRATIONS must be true or false")?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url,
                max_connections,
                run_migrations,
            },
            jwt: JwtConfig { secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(raw: Option<String>, default: bool) -> anyhow::Result<bool> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        Some(value) => Ok(value.parse::<bool>()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgresql://localhost/todoapp"),
        ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3002");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert!(config.api.cors_origins.is_empty());
        assert!(!config.api.production);
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = load(&[("DATABASE_URL", "postgresql://localhost/todoapp")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_empty_secret_is_fatal() {
        let result = load(&[
            ("DATABASE_URL", "postgresql://localhost/todoapp"),
            ("JWT_SECRET", ""),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_secret_is_accepted() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/todoapp"),
            ("JWT_SECRET", "short"),
        ])
        .unwrap();
        assert_eq!(config.jwt.secret, "short");
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("API_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://localhost:4200, https://todo.example.com"),
            ("PRODUCTION", "true"),
            ("RUN_MIGRATIONS", "0"),
        ]);
        let config = load(&vars).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["http://localhost:4200", "https://todo.example.com"]
        );
        assert!(config.api.production);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "not-a-port"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&REQUIRED).unwrap();
        assert!(!format!("{:?}", config).contains("test-secret-key"));
    }
}
