//! Environment-driven configuration, loaded once at startup and passed down
//! as request-scoped data instead of process-wide globals.

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_host: String,
    pub bind_port: u16,
    /// Signs session token digests before they are stored.
    pub secret_key: String,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub use_ssl: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender_name: String,
    /// Staff notification address(es); comma-separated list accepted.
    pub staff_addresses: Option<String>,
    /// Absolute base for admin links in staff mail, e.g. `https://hotel.test`.
    pub base_url: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            use_tls: true,
            use_ssl: false,
            username: None,
            password: None,
            sender_name: "Habeeb Empyrean Hotel & Resort".to_string(),
            staff_addresses: None,
            base_url: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:dev.db?mode=rwc".to_string(),
            bind_host: "127.0.0.1".to_string(),
            bind_port: 8080,
            secret_key: "dev-secret".to_string(),
            admin_user: None,
            admin_password: None,
            mail: MailConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        let mail_defaults = MailConfig::default();
        Self {
            database_url: env_opt("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_host: env_opt("HOST").unwrap_or(defaults.bind_host),
            bind_port: env_parse("PORT", defaults.bind_port),
            secret_key: env_opt("SECRET_KEY").unwrap_or(defaults.secret_key),
            admin_user: env_opt("ADMIN_USER"),
            admin_password: env_opt("ADMIN_PASSWORD"),
            mail: MailConfig {
                server: env_opt("MAIL_SERVER").unwrap_or(mail_defaults.server),
                port: env_parse("MAIL_PORT", mail_defaults.port),
                use_tls: env_bool("MAIL_USE_TLS", mail_defaults.use_tls),
                use_ssl: env_bool("MAIL_USE_SSL", mail_defaults.use_ssl),
                username: env_opt("MAIL_USERNAME"),
                password: env_opt("MAIL_PASSWORD"),
                sender_name: mail_defaults.sender_name,
                staff_addresses: env_opt("HOTEL_NOTIFICATION_EMAIL"),
                base_url: env_opt("BASE_URL"),
            },
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    match env_opt(name) {
        Some(raw) => matches!(raw.trim(), "True" | "true" | "1"),
        None => default,
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
