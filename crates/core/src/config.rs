use serde::Deserialize;

use crate::error::{FunnelError, FunnelResult};
use crate::profile::FunnelProfile;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `SCOUT_FUNNEL__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub funnel: FunnelConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunnelConfig {
    /// Name of a built-in profile (`scout`, `scout-lite`).
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Path to a profile file; takes precedence over `profile`.
    #[serde(default)]
    pub profile_file: Option<String>,
    /// Address of the page hosting the funnel; the `step` parameter is
    /// written into its query string.
    #[serde(default = "default_page_url")]
    pub page_url: String,
    #[serde(default)]
    pub counter: CounterConfig,
}

/// Cosmetic "opportunities found" ticker.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_start")]
    pub start: u64,
    #[serde(default = "default_counter_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_counter_max_increment")]
    pub max_increment: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Rest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the hosted database (REST backend only).
    #[serde(default)]
    pub url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

// Default functions
fn default_profile() -> String {
    "scout".to_string()
}
fn default_page_url() -> String {
    "http://localhost:3000/".to_string()
}
fn default_counter_start() -> u64 {
    47
}
fn default_counter_interval_ms() -> u64 {
    3000
}
fn default_counter_max_increment() -> u64 {
    2
}
fn default_table() -> String {
    "submissions".to_string()
}
fn default_store_timeout_ms() -> u64 {
    10_000
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            profile_file: None,
            page_url: default_page_url(),
            counter: CounterConfig::default(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            start: default_counter_start(),
            interval_ms: default_counter_interval_ms(),
            max_increment: default_counter_max_increment(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            api_key: None,
            table: default_table(),
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment
    /// variables. Environment values win over the file.
    pub fn load(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("SCOUT_FUNNEL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Resolves the profile this process should serve.
    pub fn resolve_profile(&self) -> FunnelResult<FunnelProfile> {
        if let Some(path) = &self.funnel.profile_file {
            return FunnelProfile::from_file(path);
        }
        let profile = FunnelProfile::builtin(&self.funnel.profile).ok_or_else(|| {
            FunnelError::Config(format!("unknown funnel profile '{}'", self.funnel.profile))
        })?;
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.funnel.profile, "scout");
        assert_eq!(config.funnel.counter.start, 47);
        assert_eq!(config.funnel.counter.interval_ms, 3000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.table, "submissions");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("funnel-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[funnel]
profile = "scout-lite"

[funnel.counter]
interval_ms = 500

[store]
backend = "rest"
url = "https://db.example.com"
api_key = "anon"
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.funnel.profile, "scout-lite");
        assert_eq!(config.funnel.counter.interval_ms, 500);
        assert_eq!(config.funnel.counter.start, 47);
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.store.url.as_deref(), Some("https://db.example.com"));
    }

    #[test]
    fn test_resolve_profile() {
        let mut config = AppConfig::default();
        assert_eq!(config.resolve_profile().unwrap().name, "scout");

        config.funnel.profile = "missing".to_string();
        let err = config.resolve_profile().unwrap_err();
        assert!(err.to_string().contains("unknown funnel profile"));
    }
}
