//! Application-level configuration

use serde::{Deserialize, Serialize};

/// Environment variable selecting the deployment environment
pub const ENV_ENVIRONMENT: &str = "AZAK_ENV";
/// Environment variable overriding the default log filter
pub const ENV_LOG: &str = "AZAK_LOG";
/// Environment variable switching to JSON log lines
pub const ENV_LOG_JSON: &str = "AZAK_LOG_JSON";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application name, reported in startup logs
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
    /// Filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Emit JSON log lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "azak".to_string(),
            environment: "development".to_string(),
            log_filter: "warn,azak_quota=info,azak_cli=info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(environment) = lookup(ENV_ENVIRONMENT).filter(|v| !v.trim().is_empty()) {
            config.environment = environment;
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(flag) = lookup(ENV_LOG_JSON) {
            config.json_logs = matches!(flag.trim(), "1" | "true" | "yes");
        }

        config
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
