//! Application configuration loaded from `config.toml` with environment fallbacks.

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 { 12 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_hours: default_token_ttl_hours() }
    }
}

/// One reminder rule: send on `channel` this many hours before the appointment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReminderRuleConfig {
    pub offset_hours: u32,
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_channel() -> String { "email".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Reservation fee as a whole percentage of the service price.
    #[serde(default = "default_fee_percent")]
    pub reservation_fee_percent: u32,
    #[serde(default = "default_reminders")]
    pub reminders: Vec<ReminderRuleConfig>,
}

fn default_fee_percent() -> u32 { 10 }

fn default_reminders() -> Vec<ReminderRuleConfig> {
    vec![
        ReminderRuleConfig { offset_hours: 48, channel: "email".into() },
        ReminderRuleConfig { offset_hours: 4, channel: "sms".into() },
    ]
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { reservation_fee_percent: default_fee_percent(), reminders: default_reminders() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Messaging gateway endpoint; when absent reminders are only logged.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// The salon's own inbox, used for contact inquiries.
    #[serde(default = "default_salon_address")]
    pub salon_address: String,
    /// Seconds between reminder dispatch ticks; 0 disables the dispatcher.
    #[serde(default)]
    pub dispatch_interval_secs: u64,
    #[serde(default = "default_batch_size")]
    pub dispatch_batch_size: u64,
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_secs: u64,
}

fn default_salon_address() -> String { "bookings@salon.local".into() }
fn default_batch_size() -> u64 { 50 }
fn default_webhook_timeout() -> u64 { 10 }

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            salon_address: default_salon_address(),
            dispatch_interval_secs: 0,
            dispatch_batch_size: default_batch_size(),
            webhook_timeout_secs: default_webhook_timeout(),
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise defaults filled from the environment.
    pub fn load_or_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = load_default().unwrap_or_default();
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if self.auth.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.auth.jwt_secret = secret;
            }
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.validate()?;
        self.booking.validate()?;
        self.notifier.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Environment-only configuration, used when no config file exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        cfg.normalize_from_env();
        cfg
    }

    /// `[database]` section of the default config file, URL filled from env if blank.
    pub fn from_file() -> Result<Self> {
        let mut cfg = load_default()?.database;
        cfg.normalize_from_env();
        Ok(cfg)
    }

    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be positive"));
        }
        Ok(())
    }
}

impl BookingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.reservation_fee_percent > 100 {
            return Err(anyhow!("booking.reservation_fee_percent must be within 0..=100"));
        }
        if self.reminders.is_empty() {
            return Err(anyhow!("booking.reminders must contain at least one rule"));
        }
        for rule in &self.reminders {
            if rule.offset_hours == 0 {
                return Err(anyhow!("booking.reminders offset_hours must be positive"));
            }
            if !matches!(rule.channel.as_str(), "email" | "sms") {
                return Err(anyhow!("booking.reminders channel must be email or sms, got {}", rule.channel));
            }
        }
        Ok(())
    }
}

impl NotifierConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("notifier.webhook_url must start with http(s)"));
            }
        }
        if !self.salon_address.contains('@') {
            return Err(anyhow!("notifier.salon_address must be an email address"));
        }
        if self.dispatch_batch_size == 0 {
            return Err(anyhow!("notifier.dispatch_batch_size must be positive"));
        }
        Ok(())
    }
}
