//! Configuration management
//!
//! Settings are resolved in the following order of precedence:
//! 1. Environment variables
//! 2. `atelier.toml` in the working directory
//! 3. Built-in defaults
//!
//! `${VAR_NAME}` inside the TOML file is replaced with the value of the
//! environment variable before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default config file name looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "atelier.toml";

/// Main configuration for atelier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// SQLite database configuration
    pub database: DatabaseConfig,

    /// Admin login credentials
    pub admin: AdminConfig,

    /// Database download API configuration
    pub api: ApiConfig,

    /// Admin session lifetime settings
    pub session: SessionConfig,

    /// Order notification email settings
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Directory served under `/static`
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: "./static".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./database.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

impl AdminConfig {
    /// Check a submitted username/password pair
    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bearer token for the database download endpoints.
    /// When unset every download request is refused.
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session lifetime in hours
    pub ttl_hours: i64,

    /// Interval between expired-session sweeps in seconds
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            sweep_interval_secs: 60 * 60,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Sender address, also used as the SMTP username
    pub sender: Option<String>,

    /// Address that receives order notifications
    pub recipient: Option<String>,

    /// SMTP password (app password)
    #[serde(skip_serializing)]
    pub password: Option<String>,

    pub smtp_host: String,

    pub smtp_port: u16,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender: None,
            recipient: None,
            password: None,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
        }
    }
}

impl EmailConfig {
    /// True when sender, recipient and password are all present
    pub fn is_complete(&self) -> bool {
        [&self.sender, &self.recipient, &self.password]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

impl Config {
    /// Replace `${VAR_NAME}` with the value of the environment variable.
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                while let Some(c) = chars.next() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse configuration from TOML text (after env expansion)
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load `atelier.toml` if it exists, otherwise environment only
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Ok(Self::from_env())
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    fn apply_env_overrides(&mut self) {
        fn non_empty(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        }

        // Server
        if let Some(host) = non_empty("HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = non_empty("STATIC_DIR") {
            self.server.static_dir = dir;
        }

        // Database
        if let Some(path) = non_empty("DB_PATH") {
            self.database.path = path;
        }

        // Admin
        if let Some(username) = non_empty("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(password) = non_empty("ADMIN_PASSWORD") {
            self.admin.password = password;
        }

        // API
        if let Some(token) = non_empty("API_TOKEN") {
            self.api.token = Some(token);
        }

        // Session
        if let Some(ttl) = non_empty("SESSION_TTL_HOURS").and_then(|v| v.parse().ok()) {
            self.session.ttl_hours = ttl;
        }
        if let Some(secs) = non_empty("SESSION_SWEEP_SECS").and_then(|v| v.parse().ok()) {
            self.session.sweep_interval_secs = secs;
        }

        // Email
        if let Some(sender) = non_empty("EMAIL_SENDER_ADDRESS") {
            self.email.sender = Some(sender);
        }
        if let Some(recipient) = non_empty("EMAIL_RECIPIENT_ADDRESS") {
            self.email.recipient = Some(recipient);
        }
        if let Some(password) = non_empty("GOOGLE_APP_PASSWORD") {
            self.email.password = Some(password);
        }
        if let Some(host) = non_empty("SMTP_HOST") {
            self.email.smtp_host = host;
        }
        if let Some(port) = non_empty("SMTP_PORT").and_then(|p| p.parse().ok()) {
            self.email.smtp_port = port;
        }
    }

    /// Socket address string for the HTTP server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "./database.db");
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.password, "password");
        assert!(config.api.token.is_none());
        assert_eq!(config.session.ttl(), chrono::Duration::hours(24));
        assert_eq!(config.session.sweep_interval().as_secs(), 3600);
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 587);
    }

    #[test]
    fn test_admin_verify() {
        let admin = AdminConfig::default();
        assert!(admin.verify("admin", "password"));
        assert!(!admin.verify("admin", "wrong"));
        assert!(!admin.verify("root", "password"));
    }

    #[test]
    fn test_email_is_complete() {
        let mut email = EmailConfig::default();
        assert!(!email.is_complete());

        email.sender = Some("shop@example.com".to_string());
        email.recipient = Some("artist@example.com".to_string());
        email.password = Some(String::new());
        assert!(!email.is_complete());

        email.password = Some("app-password".to_string());
        assert!(email.is_complete());
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("ATELIER_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${ATELIER_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${ATELIER_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("ATELIER_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("${}_content"), "_content");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[server]
port = 9090
static_dir = "/srv/static"

[database]
path = "/var/lib/atelier/site.db"

[admin]
username = "emma"

[session]
ttl_hours = 12
"#;

        let config = Config::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.static_dir, "/srv/static");
        assert_eq!(config.database.path, "/var/lib/atelier/site.db");
        assert_eq!(config.admin.username, "emma");
        assert_eq!(config.admin.password, "password");
        assert_eq!(config.session.ttl_hours, 12);
        assert_eq!(config.session.sweep_interval_secs, 3600);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
