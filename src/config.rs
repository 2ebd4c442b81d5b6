use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Confirmation code settings for the passwordless signup flow.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub confirmation_ttl_hours: i64,
    /// bcrypt cost used when storing confirmation codes.
    pub confirmation_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    pub page_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Write outgoing mail to the log instead of delivering it.
    Log,
    Smtp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();

        let backend = match env_or("MAIL_BACKEND", "log").to_lowercase().as_str() {
            "log" => MailBackend::Log,
            "smtp" => MailBackend::Smtp,
            other => anyhow::bail!("Unknown MAIL_BACKEND: {}", other),
        };

        Ok(Config {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: parse_env("SERVER_PORT", 8080),
            },
            jwt: JwtConfig {
                secret: env_or("JWT_SECRET", "your-secret-key-change-this"),
                expiration_hours: parse_env("JWT_EXPIRATION_HOURS", 24),
            },
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", "sqlite://reviewhub.db?mode=rwc"),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
            },
            auth: AuthConfig {
                confirmation_ttl_hours: parse_env("CONFIRMATION_CODE_TTL_HOURS", 72),
                confirmation_cost: parse_env("CONFIRMATION_CODE_COST", 10),
            },
            pagination: PaginationConfig {
                page_size: parse_env("PAGE_SIZE", 10),
            },
            mail: MailConfig {
                backend,
                smtp_host: env::var("SMTP_HOST").ok(),
                smtp_port: parse_env("SMTP_PORT", 587),
                smtp_username: env_or("SMTP_USERNAME", ""),
                smtp_password: env_or("SMTP_PASSWORD", ""),
                from: env_or("MAIL_FROM", "reviewhub <noreply@reviewhub.local>"),
            },
        })
    }
}
