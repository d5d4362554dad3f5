use serde::{Deserialize, Serialize};

/// Default service endpoint
pub const DEFAULT_BASE_URL: &str = "https://workasana-backend-ten.vercel.app/";

/// Client configuration from config.toml. Every field has a default, so a
/// missing or empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Trailing window for the local "completed last week" report
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            window_days: default_window_days(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("taskdeck/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_window_days() -> u32 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.report.window_days, 7);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"[api]
base_url = "http://localhost:4000"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:4000");
        assert_eq!(config.api.timeout_secs, 30);
    }
}
