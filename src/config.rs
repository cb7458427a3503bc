use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub start_endpoint: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub target_category: String,
    /// kg per cubic metre.
    pub conversion_factor: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
}

impl Settings {
    /// Loads `<config_dir>/default.toml`, then `<config_dir>/local.toml` if
    /// present, then `CWC_`-prefixed environment variables
    /// (e.g. `CWC_CATALOG__TARGET_CATEGORY`).
    ///
    /// Values are not validated here; callers apply their own overrides first
    /// and then call [`Settings::validate`].
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(config_dir, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("CWC")
            .prefix_separator("_")
            .separator("__")
    }

    fn load_with_env(config_dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        let default_path = config_dir.join("default");
        let local_path = config_dir.join("local");
        let builder = Config::builder()
            .add_source(File::with_name(&default_path.to_string_lossy()).required(true))
            .add_source(File::with_name(&local_path.to_string_lossy()).required(false))
            .add_source(env);

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Message(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.start_endpoint.trim().is_empty() {
            return Err(ConfigError::Message("api.start_endpoint is empty".into()));
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "api.timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.catalog.target_category.is_empty() {
            return Err(ConfigError::Message("catalog.target_category is empty".into()));
        }
        let factor = self.catalog.conversion_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::Message(format!(
                "catalog.conversion_factor must be a positive number, got {}",
                factor
            )));
        }
        Ok(())
    }
}
