use std::path::PathBuf;
use std::str::FromStr;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PictalkConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
    pub secret_key: String,
    pub debug: bool,
    pub testing: bool,
    pub error_log: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            secret_key: DEV_SECRET_KEY.to_string(),
            debug: true,
            testing: false,
            error_log: PathBuf::from("error.log"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub api_version: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_prefix: "/api".to_string(),
            api_version: "v1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub folder: PathBuf,
    pub max_content_length: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("uploads"),
            max_content_length: MAX_CONTENT_LENGTH,
            allowed_extensions: ["png", "jpg", "jpeg", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chatbot.db"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub lifetime_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { lifetime_hours: 24 }
    }
}

/// Placeholders for the recognition models. Nothing loads them yet.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub cnn_model: String,
    pub nlp_model: String,
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cnn_model: "mobilenet_v2".to_string(),
            nlp_model: "distilbert-base-uncased".to_string(),
            path: PathBuf::from("models/"),
        }
    }
}

/// Deployment profile selecting debug/testing flags and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Testing,
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "default" | "" => Ok(Profile::Development),
            "production" => Ok(Profile::Production),
            "testing" => Ok(Profile::Testing),
            other => Err(ConfigError::Message(format!("unknown profile: {}", other))),
        }
    }
}

impl PictalkConfig {
    /// Load defaults, then the optional TOML file, then `PICTALK__*` env vars,
    /// then the profile overrides.
    pub fn load(path: &str, profile: Profile) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PICTALK")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_extensions")
                    .try_parsing(true),
            )
            .build()?;
        let mut config: PictalkConfig = s.try_deserialize()?;
        config.apply_profile(profile, std::env::var("SECRET_KEY").ok())?;
        Ok(config)
    }

    pub fn apply_profile(
        &mut self,
        profile: Profile,
        secret_key: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = secret_key.clone().filter(|k| !k.is_empty()) {
            self.service.secret_key = key;
        }

        match profile {
            Profile::Development => {
                self.service.debug = true;
            }
            Profile::Production => {
                self.service.debug = false;
                self.service.testing = false;
                if secret_key.map_or(true, |k| k.is_empty()) {
                    return Err(ConfigError::Message(
                        "SECRET_KEY must be set for the production profile".to_string(),
                    ));
                }
            }
            Profile::Testing => {
                self.service.debug = true;
                self.service.testing = true;
                self.database.path = PathBuf::from("test_chatbot.db");
            }
        }
        Ok(())
    }

    pub fn session_lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.lifetime_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_prototype_settings() {
        let config = PictalkConfig::default();
        assert_eq!(config.upload.max_content_length, 16 * 1024 * 1024);
        assert_eq!(
            config.upload.allowed_extensions,
            vec!["png", "jpg", "jpeg", "gif"]
        );
        assert_eq!(config.database.path, PathBuf::from("chatbot.db"));
        assert_eq!(config.session_lifetime(), chrono::Duration::hours(24));
        assert_eq!(config.model.cnn_model, "mobilenet_v2");
        assert_eq!(config.http.api_prefix, "/api");
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("production".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!("Testing".parse::<Profile>().unwrap(), Profile::Testing);
        assert_eq!("default".parse::<Profile>().unwrap(), Profile::Development);
        assert!("staging".parse::<Profile>().is_err());
    }

    #[test]
    fn test_testing_profile_overrides_database() {
        let mut config = PictalkConfig::default();
        config.apply_profile(Profile::Testing, None).unwrap();
        assert!(config.service.testing);
        assert!(config.service.debug);
        assert_eq!(config.database.path, PathBuf::from("test_chatbot.db"));
    }

    #[test]
    fn test_production_requires_secret_key() {
        let mut config = PictalkConfig::default();
        assert!(config.apply_profile(Profile::Production, None).is_err());

        let mut config = PictalkConfig::default();
        config
            .apply_profile(Profile::Production, Some("s3cret".to_string()))
            .unwrap();
        assert!(!config.service.debug);
        assert_eq!(config.service.secret_key, "s3cret");
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pictalk.toml");
        std::fs::write(
            &path,
            "[http]\nport = 8080\n\n[upload]\nfolder = \"media\"\n",
        )
        .unwrap();

        let config = PictalkConfig::load(path.to_str().unwrap(), Profile::Development).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.upload.folder, PathBuf::from("media"));
        assert_eq!(config.upload.max_content_length, MAX_CONTENT_LENGTH);
    }
}
