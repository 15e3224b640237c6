//! Application state for order-server

use jsonwebtoken::Algorithm;
use sqlx::PgPool;

use crate::auth::jwt::{JwtConfig, JwtService};
use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Token service for issuing and validating bearer tokens
    pub jwt: JwtService,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        // Only HMAC algorithms can be keyed from a shared secret
        let algorithm = match config.jwt_algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(format!("Unsupported JWT_ALGORITHM: {other}").into()),
        };

        let jwt = JwtService::with_config(JwtConfig {
            secret: config.jwt_secret.clone(),
            algorithm,
            access_token_minutes: config.access_token_minutes,
        });

        Ok(Self { pool, jwt })
    }
}
