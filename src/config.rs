use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Azure OpenAI deployment used for nutrition lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_query_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "dietcal".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "dietcal-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let llm = LlmConfig {
            endpoint: std::env::var("AZURE_OPENAI_ENDPOINT")?,
            api_key: std::env::var("AZURE_OPENAI_API_KEY")?,
            deployment: std::env::var("AZURE_OPENAI_DEPLOYMENT")?,
            api_version: std::env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-06-01".into()),
            timeout_secs: env_or("LLM_TIMEOUT_SECS", 30),
            temperature: env_or("LLM_TEMPERATURE", 1.0),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            db_query_timeout_secs: env_or("DB_QUERY_TIMEOUT_SECS", 10),
            jwt,
            llm,
        })
    }
}

/// Reads an optional numeric variable, falling back when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
