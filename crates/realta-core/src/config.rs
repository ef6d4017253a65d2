use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,
    #[serde(default = "default_types_path")]
    pub types_path: PathBuf,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default)]
    pub xnat: BTreeMap<String, XnatAlias>,
}

/// Connection details for one named XNAT instance.
#[derive(Clone, Deserialize)]
pub struct XnatAlias {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for XnatAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XnatAlias")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

fn default_rules_path() -> PathBuf {
    PathBuf::from("config/tags.yaml")
}

fn default_types_path() -> PathBuf {
    PathBuf::from("config/types.csv")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".realta-cache")
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rules_path: default_rules_path(),
            types_path: default_types_path(),
            cache_dir: default_cache_dir(),
            xnat: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn alias(&self, name: &str) -> Result<&XnatAlias, Error> {
        let alias = self.xnat.get(name).ok_or_else(|| {
            Error::Configuration(format!(
                "no XNAT alias '{}' configured (known: {})",
                name,
                self.xnat.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })?;
        if alias.url.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "XNAT alias '{}' has no url",
                name
            )));
        }
        Ok(alias)
    }
}

/// Load `Config.toml` (optional) overlaid with `REALTA__*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("REALTA").separator("__"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(text: &str) -> AppConfig {
        Config::builder()
            .add_source(ConfigFile::from_str(text, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = from_toml("");
        assert_eq!(config.rules_path, PathBuf::from("config/tags.yaml"));
        assert_eq!(config.cache_dir, PathBuf::from(".realta-cache"));
        assert!(config.xnat.is_empty());
    }

    #[test]
    fn test_alias_lookup() {
        let config = from_toml(
            r#"
            rules_path = "rules.yaml"

            [xnat.cbscentral]
            url = "https://cbscentral.example.org"
            username = "alice"
            password = "secret"
            "#,
        );
        assert_eq!(config.rules_path, PathBuf::from("rules.yaml"));
        assert_eq!(
            config.alias("cbscentral").unwrap().url,
            "https://cbscentral.example.org"
        );
        assert!(matches!(
            config.alias("other"),
            Err(Error::Configuration(msg)) if msg.contains("cbscentral")
        ));
    }

    #[test]
    fn test_password_masked_in_debug() {
        let alias = XnatAlias {
            url: "https://x".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        let shown = format!("{:?}", alias);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("alice"));
    }
}
