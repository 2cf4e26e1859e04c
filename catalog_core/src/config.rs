use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::CategorySchema;

pub const DEFAULT_CONFIG_PATH: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    pub session_file: PathBuf,
    /// Categories added to, or replacing, the built-in ones.
    pub categories: Vec<CategorySchema>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid API url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            session_file: PathBuf::from("session.toml"),
            categories: Vec::new(),
        }
    }
}

impl Config {
    /// Reads the config file at `path` (falling back to defaults if there is
    /// none), then applies overrides from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.api_url()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overrides settings with the values `lookup` finds for their
    /// environment variables.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("CATALOG_API_URL") {
            self.api_url = url;
        } else {
            info!("CATALOG_API_URL not set, using {}", self.api_url);
        }
        if let Some(value) = lookup("CATALOG_TIMEOUT_SECS") {
            self.timeout_secs = value.trim().parse().map_err(|err| {
                warn!("invalid CATALOG_TIMEOUT_SECS value: {err}");
                ConfigError::InvalidValue { key: "CATALOG_TIMEOUT_SECS", value }
            })?;
        }
        if let Some(path) = lookup("CATALOG_SESSION_FILE") {
            self.session_file = PathBuf::from(path);
        }
        Ok(())
    }

    /// The API base, which must be an http(s) URL. Trailing slashes are
    /// dropped.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme {scheme}"),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The built-in categories followed by the configured ones. A configured
    /// category replaces the built-in category with the same key.
    pub fn all_categories(&self) -> Vec<CategorySchema> {
        let mut categories: Vec<_> = CategorySchema::builtin()
            .into_iter()
            .filter(|builtin| !self.categories.iter().any(|custom| custom.key == builtin.key))
            .collect();
        categories.extend(self.categories.iter().cloned());
        categories
    }

    pub fn category(&self, key: &str) -> Option<CategorySchema> {
        self.all_categories().into_iter().find(|category| category.key == key)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_file_or_environment() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[])).unwrap();
        assert_eq!(config.api_url().unwrap().as_str(), "http://localhost:5000/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.session_file, PathBuf::from("session.toml"));
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::from_toml(
            r#"
            api_url = "http://file.example"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        config
            .apply_overrides(lookup(&[
                ("CATALOG_API_URL", "https://env.example/api/"),
                ("CATALOG_SESSION_FILE", "/tmp/user.toml"),
            ]))
            .unwrap();
        assert_eq!(config.api_url().unwrap().as_str(), "https://env.example/api");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.session_file, PathBuf::from("/tmp/user.toml"));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_overrides(lookup(&[("CATALOG_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "CATALOG_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn only_http_urls_are_accepted() {
        let config = Config { api_url: "ftp://files.example".to_string(), ..Config::default() };
        assert!(matches!(config.api_url(), Err(ConfigError::InvalidUrl { .. })));
        let config = Config { api_url: "not a url".to_string(), ..Config::default() };
        assert!(matches!(config.api_url(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn configured_categories_extend_and_replace_builtins() {
        let config = Config::from_toml(
            r#"
            [[categories]]
            key = "wood"
            title = "Timber"
            endpoint = "timberRoute/timber"
            detail_route = "/timberview"

            [[categories.blocks]]
            title_field = "wood"
            attributes = []

            [[categories]]
            key = "bricks"
            title = "Bricks"
            endpoint = "brickRoute/bricks"
            detail_route = "/brickview"
            preview_limit = 4

            [[categories.blocks]]
            title_field = "brand"
            attributes = [{ label = "Grade", field = "grade" }]
            "#,
        )
        .unwrap();

        let keys: Vec<_> = config.all_categories().into_iter().map(|category| category.key).collect();
        assert_eq!(keys, ["pgHostel", "pipeWires", "wood", "bricks"]);
        assert_eq!(config.category("wood").unwrap().title, "Timber");
        assert_eq!(config.category("bricks").unwrap().preview_limit, Some(4));
        assert!(config.category("cars").is_none());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/definitely/not/catalog.toml")).unwrap();
        assert!(config.categories.is_empty());
    }
}
