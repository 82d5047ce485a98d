use std::time::Duration;

use query_cache::CacheConfig;
use serde::Deserialize;

use crate::{cli::GlobalArgs, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/finflow.toml";
const ENV_PREFIX: &str = "FINFLOW";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub email: String,
    pub level: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
    pub request_timeout_secs: u64,
    pub session_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            email: String::new(),
            level: "warn".to_string(),
            page_size: finflow_client::DEFAULT_PAGE_SIZE,
            search_debounce_ms: 300,
            stale_time_secs: 0,
            gc_time_secs: 300,
            request_timeout_secs: 30,
            session_path: "config/finflow_session.json".to_string(),
        }
    }
}

impl AppConfig {
    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            stale_time: Duration::from_secs(self.stale_time_secs),
            gc_time: Duration::from_secs(self.gc_time_secs),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// File, then `FINFLOW_*` environment, then command-line overrides.
pub fn load(args: &GlobalArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(email) = &args.email {
        settings.email = email.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(session_path) = &args.session_path {
        settings.session_path = session_path.clone();
    }

    Ok(settings)
}
