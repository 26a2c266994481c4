use std::env;

use anyhow::{Context, Result, bail};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl: usize,
    pub api_prefix: String,
    pub app_env: String,
    pub log_dir: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:3000"),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            run_migrations: var_or("RUN_MIGRATIONS", "true")
                .parse()
                .context("RUN_MIGRATIONS must be true or false")?,
            jwt_secret,
            token_ttl: var_or("TOKEN_TTL", "604800") // default 7 days
                .parse()
                .context("TOKEN_TTL must be a number of seconds")?,
            api_prefix: var_or("API_PREFIX", "/api"),
            app_env: var_or("APP_ENV", "production"),
            log_dir: var_or("LOG_DIR", "logs"),
        })
    }

    /// Development mode renders internal error detail and logs at debug.
    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            run_migrations: false,
            jwt_secret: "test-secret".to_string(),
            token_ttl: 3600,
            api_prefix: "/api".to_string(),
            app_env: "test".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}
