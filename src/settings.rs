use config::{Config, ConfigError, Environment, File};
use cron::Schedule;
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

/// How the public policy treats unauthenticated callers.
///
/// - `Open` → every caller passes the public policy
/// - `Strict` → a low- or high-privilege credential is required
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Open,
    Strict,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub public_base_url: Option<String>,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default)]
    pub run_migrations: bool,

    #[serde(default)]
    pub auth_mode: AuthMode,

    #[serde(default)]
    pub public_api_key: Option<String>,

    #[serde(default)]
    pub admin_api_key: Option<String>,

    #[serde(default)]
    pub admin_secret: Option<String>,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max_requests: u64,

    #[serde(default)]
    pub trust_forwarded_for: bool,

    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,

    #[serde(default = "default_upload_types")]
    pub allowed_upload_types: Vec<String>,

    #[serde(default)]
    pub storage_url: Option<String>,

    #[serde(default)]
    pub storage_key: Option<String>,

    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,

    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,

    #[serde(default)]
    pub mail_api_key: Option<String>,

    #[serde(default)]
    pub mail_from_address: Option<String>,

    #[serde(default = "default_mail_from_name")]
    pub mail_from_name: String,

    #[serde(default)]
    pub unsubscribe_url: Option<String>,

    #[serde(default = "default_batch_size")]
    pub newsletter_batch_size: usize,

    #[serde(default = "default_batch_delay")]
    pub newsletter_batch_delay_ms: u64,

    #[serde(default = "default_max_errors")]
    pub newsletter_max_errors: usize,

    #[serde(default)]
    pub keep_alive_enabled: bool,

    /// Six-field cron expression (seconds first), evaluated in UTC.
    #[serde(default = "default_keep_alive_schedule")]
    pub keep_alive_schedule: String,

    #[serde(default = "default_keep_alive_delay")]
    pub keep_alive_initial_delay_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Civic-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_api_version() -> String {
    "v1".to_string()
}
fn default_db_max_connections() -> u32 {
    20
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_rate_limit_window() -> u64 {
    15 * 60
}
fn default_rate_limit_max() -> u64 {
    100
}
fn default_max_upload_size() -> usize {
    5 * 1024 * 1024
}
fn default_upload_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}
fn default_storage_bucket() -> String {
    "content".to_string()
}
fn default_mail_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_mail_from_name() -> String {
    "Civic Updates".to_string()
}
fn default_batch_size() -> usize {
    50
}
fn default_batch_delay() -> u64 {
    1000
}
fn default_max_errors() -> usize {
    10
}
fn default_keep_alive_schedule() -> String {
    "0 */14 * * * *".into()
}
fn default_keep_alive_delay() -> u64 {
    60
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .with_list_parse_key("allowed_upload_types")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Hosted Postgres providers usually export the unprefixed name
        config.database_url = fill_or_env(config.database_url, "DATABASE_URL")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.auth_mode == AuthMode::Strict && is_blank(&self.public_api_key) {
            errors.push("PUBLIC_API_KEY must be set when AUTH_MODE is strict");
        }
        if self.newsletter_batch_size == 0 {
            errors.push("NEWSLETTER_BATCH_SIZE must be greater than zero");
        }
        if self.rate_limit_window_secs == 0 || self.rate_limit_max_requests == 0 {
            errors.push("Rate limit window and ceiling must be greater than zero");
        }
        if self.keep_alive_enabled && self.keep_alive_schedule().is_err() {
            errors.push("APP_KEEP_ALIVE_SCHEDULE must be a valid cron expression");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn upload_types(&self) -> Vec<String> {
        self.allowed_upload_types
            .iter()
            .flat_map(|t| t.split(','))
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Externally reachable base URL, without trailing slash.
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }

    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn newsletter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.newsletter_batch_delay_ms)
    }

    pub fn keep_alive_schedule(&self) -> Result<Schedule, ConfigError> {
        Schedule::from_str(self.keep_alive_schedule.trim())
            .map_err(|e| ConfigError::Message(format!("Invalid keep-alive schedule: {}", e)))
    }

    pub fn keep_alive_initial_delay(&self) -> Duration {
        Duration::from_secs(self.keep_alive_initial_delay_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            api_version: default_api_version(),
            public_base_url: None,
            database_url: String::new(),
            db_max_connections: default_db_max_connections(),
            run_migrations: false,
            auth_mode: AuthMode::default(),
            public_api_key: None,
            admin_api_key: None,
            admin_secret: None,
            cors_allowed_origins: default_cors_origins(),
            rate_limit_window_secs: default_rate_limit_window(),
            rate_limit_max_requests: default_rate_limit_max(),
            trust_forwarded_for: false,
            max_upload_size: default_max_upload_size(),
            allowed_upload_types: default_upload_types(),
            storage_url: None,
            storage_key: None,
            storage_bucket: default_storage_bucket(),
            mail_api_url: default_mail_api_url(),
            mail_api_key: None,
            mail_from_address: None,
            mail_from_name: default_mail_from_name(),
            unsubscribe_url: None,
            newsletter_batch_size: default_batch_size(),
            newsletter_batch_delay_ms: default_batch_delay(),
            newsletter_max_errors: default_max_errors(),
            keep_alive_enabled: false,
            keep_alive_schedule: default_keep_alive_schedule(),
            keep_alive_initial_delay_secs: default_keep_alive_delay(),
        }
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(value) => value.redact(),
            None => "[MISSING]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("api_version", &self.api_version)
            .field("public_base_url", &self.public_base_url)
            .field("database_url", &self.database_url.redact())
            .field("db_max_connections", &self.db_max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("auth_mode", &self.auth_mode)
            .field("public_api_key", &self.public_api_key.redact())
            .field("admin_api_key", &self.admin_api_key.redact())
            .field("admin_secret", &self.admin_secret.redact())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .field("max_upload_size", &self.max_upload_size)
            .field("allowed_upload_types", &self.allowed_upload_types)
            .field("storage_url", &self.storage_url)
            .field("storage_key", &self.storage_key.redact())
            .field("storage_bucket", &self.storage_bucket)
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_api_key", &self.mail_api_key.redact())
            .field("mail_from_address", &self.mail_from_address)
            .field("mail_from_name", &self.mail_from_name)
            .field("unsubscribe_url", &self.unsubscribe_url)
            .field("newsletter_batch_size", &self.newsletter_batch_size)
            .field("newsletter_batch_delay_ms", &self.newsletter_batch_delay_ms)
            .field("keep_alive_enabled", &self.keep_alive_enabled)
            .field("keep_alive_schedule", &self.keep_alive_schedule)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_split_comma_lists() {
        let config = AppConfig {
            cors_allowed_origins: vec!["https://a.example, https://b.example".into(), " ".into()],
            ..AppConfig::default()
        };

        assert_eq!(config.cors_origins(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn strict_mode_requires_public_key() {
        let config = AppConfig {
            database_url: "postgres://localhost/civic".into(),
            auth_mode: AuthMode::Strict,
            ..AppConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn keep_alive_schedule_must_parse_when_enabled() {
        let config = AppConfig {
            database_url: "postgres://localhost/civic".into(),
            keep_alive_enabled: true,
            keep_alive_schedule: "every fourteen minutes".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig { keep_alive_schedule: default_keep_alive_schedule(), ..config };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_rejects_wildcard_cors() {
        let config = AppConfig {
            env: AppEnvironment::Production,
            database_url: "postgres://localhost/civic".into(),
            ..AppConfig::default()
        };

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Wildcard CORS"));
    }

    #[test]
    fn base_url_falls_back_to_listen_address() {
        let config = AppConfig {
            port: 9000,
            ..AppConfig::default()
        };
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");

        let config = AppConfig {
            public_base_url: Some("https://civic.example/".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.base_url(), "https://civic.example");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AppConfig {
            database_url: "postgres://user:hunter2@db/civic".into(),
            admin_api_key: Some("super-secret-admin".into()),
            ..AppConfig::default()
        };

        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("super-secret-admin"));
    }
}
