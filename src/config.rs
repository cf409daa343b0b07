//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storefront base URL; product pages live under `<base_url>/dp/<asin>`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Address the HTTP service listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Session cookie sent with every product request
    #[serde(default)]
    pub cookie: Option<String>,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.amazon.com".to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listen_addr: default_listen_addr(),
            database_path: default_database_path(),
            cookie: None,
            user_agent: default_user_agent(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("amz-price").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("AMZ_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(listen) = std::env::var("AMZ_LISTEN") {
            self.listen_addr = listen;
        }

        if let Ok(database) = std::env::var("AMZ_DATABASE") {
            self.database_path = PathBuf::from(database);
        }

        if let Ok(cookie) = std::env::var("AMZ_COOKIE") {
            self.cookie = Some(cookie);
        }

        if let Ok(proxy) = std::env::var("AMZ_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(timeout) = std::env::var("AMZ_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.amazon.com");
        assert_eq!(config.listen_addr, "127.0.0.1:8000");
        assert_eq!(config.database_path, PathBuf::from("database.db"));
        assert!(config.user_agent.contains("Firefox/121.0"));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.cookie.is_none());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            listen_addr = "0.0.0.0:9000"
            cookie = "session-id=1"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.cookie.as_deref(), Some("session-id=1"));
        // Unset fields keep their defaults
        assert_eq!(config.base_url, "https://www.amazon.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            base_url = "https://www.amazon.co.uk"
            listen_addr = "[::1]:8080"
            database_path = "/var/lib/amz-price/prices.db"
            cookie = "i18n-prefs=GBP"
            user_agent = "curl/8.0"
            proxy = "socks5://localhost:1080"
            timeout_secs = 5
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://www.amazon.co.uk");
        assert_eq!(config.listen_addr, "[::1]:8080");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/amz-price/prices.db"));
        assert_eq!(config.cookie.as_deref(), Some("i18n-prefs=GBP"));
        assert_eq!(config.user_agent, "curl/8.0");
        assert_eq!(config.proxy.as_deref(), Some("socks5://localhost:1080"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            database_path = "prices.db"
            timeout_secs = 12
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("prices.db"));
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"listen_addr = "127.0.0.1:1234""#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:1234");
    }

    #[test]
    fn test_config_with_env() {
        let orig_cookie = std::env::var("AMZ_COOKIE").ok();
        let orig_timeout = std::env::var("AMZ_TIMEOUT").ok();

        std::env::set_var("AMZ_COOKIE", "session-id=env");
        std::env::set_var("AMZ_TIMEOUT", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.cookie.as_deref(), Some("session-id=env"));
        // Invalid values are ignored
        assert_eq!(config.timeout_secs, 30);

        match orig_cookie {
            Some(v) => std::env::set_var("AMZ_COOKIE", v),
            None => std::env::remove_var("AMZ_COOKIE"),
        }
        match orig_timeout {
            Some(v) => std::env::set_var("AMZ_TIMEOUT", v),
            None => std::env::remove_var("AMZ_TIMEOUT"),
        }
    }

    #[test]
    fn test_config_database_from_env() {
        let orig = std::env::var("AMZ_DATABASE").ok();

        std::env::set_var("AMZ_DATABASE", "/tmp/amz-env.db");
        let config = Config::new().with_env();
        assert_eq!(config.database_path, PathBuf::from("/tmp/amz-env.db"));

        match orig {
            Some(v) => std::env::set_var("AMZ_DATABASE", v),
            None => std::env::remove_var("AMZ_DATABASE"),
        }
    }
}
