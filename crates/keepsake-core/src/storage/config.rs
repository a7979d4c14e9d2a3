//! TOML-based application configuration.
//!
//! Stores:
//! - the hosted gateway URL, anon key and bucket names
//! - the landing page copy
//! - an optional fixed seed for celebration effects
//!
//! Configuration is stored at `~/.config/keepsake/config.toml`.
//! `KEEPSAKE_GATEWAY_URL` and `KEEPSAKE_ANON_KEY` override the file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

pub const ENV_GATEWAY_URL: &str = "KEEPSAKE_GATEWAY_URL";
pub const ENV_ANON_KEY: &str = "KEEPSAKE_ANON_KEY";

/// Hosted table/storage service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
    #[serde(default = "default_media_bucket")]
    pub media_bucket: String,
}

/// Landing page copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingConfig {
    #[serde(default = "default_recipient")]
    pub recipient: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CelebrationConfig {
    /// Fixed seed for effect attributes. Fresh entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/keepsake/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub landing: LandingConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
}

fn default_photo_bucket() -> String {
    "photos".into()
}
fn default_media_bucket() -> String {
    "post-media".into()
}
fn default_recipient() -> String {
    "my love".into()
}
fn default_greeting() -> String {
    "Will you be my Valentine?".into()
}
fn default_subtitle() -> String {
    "Every day with you feels like February 14th".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            photo_bucket: default_photo_bucket(),
            media_bucket: default_media_bucket(),
        }
    }
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            recipient: default_recipient(),
            greeting: default_greeting(),
            subtitle: default_subtitle(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                Value::Bool(_) => Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                // Numbers are optional; empty or "none" clears them.
                Value::Number(_) | Value::Null => match value {
                    "" | "none" => Value::Null,
                    v => Value::Number(
                        v.parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{v}' as number")))?
                            .into(),
                    ),
                },
                Value::Object(_) | Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                Value::String(_) => Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults when the file is missing.
    /// Environment overrides are applied on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// The file alone, without environment overrides. Use this before `save`.
    pub fn load_file() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Override gateway settings from the environment. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_GATEWAY_URL).filter(|v| !v.is_empty()) {
            self.gateway.url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.is_empty()) {
            self.gateway.anon_key = key;
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    /// A non-empty `gateway.url` must be an absolute http(s) URL.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if key == "gateway.url" && !value.is_empty() {
            validate_gateway_url(value)?;
        }
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Dot-path keys of every leaf setting.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let Ok(Value::Object(sections)) = serde_json::to_value(self) {
            for (section, fields) in sections {
                if let Value::Object(fields) = fields {
                    keys.extend(fields.keys().map(|field| format!("{section}.{field}")));
                }
            }
        }
        keys
    }
}

fn validate_gateway_url(value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: "gateway.url".into(),
        message,
    };
    let parsed = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("scheme must be http or https, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.gateway.photo_bucket, "photos");
        assert_eq!(parsed.celebration.seed, None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[gateway]\nurl = \"https://x.example\"\n").unwrap();
        assert_eq!(parsed.gateway.url, "https://x.example");
        assert_eq!(parsed.gateway.media_bucket, "post-media");
        assert_eq!(parsed.landing, LandingConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("gateway.photo_bucket").as_deref(), Some("photos"));
        assert_eq!(cfg.get("celebration.seed").as_deref(), Some("null"));
        assert!(cfg.get("gateway.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_string_and_optional_number() {
        let mut cfg = Config::default();
        cfg.set("landing.recipient", "Sam").unwrap();
        cfg.set("celebration.seed", "42").unwrap();
        assert_eq!(cfg.landing.recipient, "Sam");
        assert_eq!(cfg.celebration.seed, Some(42));

        cfg.set("celebration.seed", "none").unwrap();
        assert_eq!(cfg.celebration.seed, None);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("gateway.nonexistent_key", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
        assert!(cfg.set("nope", "x").is_err());
    }

    #[test]
    fn set_rejects_invalid_number() {
        let mut cfg = Config::default();
        assert!(cfg.set("celebration.seed", "forty").is_err());
        assert_eq!(cfg.celebration.seed, None);
    }

    #[test]
    fn set_validates_gateway_url() {
        let mut cfg = Config::default();
        assert!(cfg.set("gateway.url", "not a url").is_err());
        assert!(cfg.set("gateway.url", "ftp://files.example").is_err());
        cfg.set("gateway.url", "https://abc.supabase.co").unwrap();
        assert_eq!(cfg.gateway.url, "https://abc.supabase.co");
    }

    #[test]
    fn env_overrides_gateway() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|name| match name {
            ENV_GATEWAY_URL => Some("https://env.example".into()),
            ENV_ANON_KEY => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.gateway.url, "https://env.example");
        assert_eq!(cfg.gateway.anon_key, "");
    }

    #[test]
    fn keys_lists_every_leaf() {
        let keys = Config::default().keys();
        assert!(keys.contains(&"gateway.url".to_string()));
        assert!(keys.contains(&"landing.subtitle".to_string()));
        assert!(keys.contains(&"celebration.seed".to_string()));
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("landing.greeting", "Hi").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().landing.greeting, "Hi");
    }

    #[test]
    fn broken_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "gateway = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }
}
