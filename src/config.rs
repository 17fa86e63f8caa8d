use anyhow::{Context, Result};
use axum::http::HeaderName;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmarks service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: i32,
    #[serde(default)]
    pub turso_url: Option<String>,
    #[serde(default)]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_sync_interval() -> u64 {
    60
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    /// Header the upstream gateway uses to forward the authenticated user id.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for Auth {
    fn default() -> Self {
        Auth {
            identity_header: default_identity_header(),
        }
    }
}

impl Auth {
    pub fn header_name(&self) -> Result<HeaderName> {
        HeaderName::from_bytes(self.identity_header.trim().as_bytes())
            .with_context(|| format!("invalid identity header name {:?}", self.identity_header))
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        return &self.database;
    }

    pub fn get_port(&self) -> i32 {
        return self.port;
    }

    /// Turso credentials, only when both are set to something non-empty.
    pub fn replica_credentials(&self) -> Option<(String, String)> {
        let url = self.turso_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let token = self
            .turso_auth_token
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;
        Some((url.to_string(), token.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub auth: Auth,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!(variable = %var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_optional_sections_are_missing() {
        let cfg = Config::from_yaml("app:\n  database: bookmarks.db\n  port: 8080\n").unwrap();

        assert_eq!(cfg.app.get_db(), "bookmarks.db");
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.app.sync_interval_seconds, 60);
        assert_eq!(cfg.auth.identity_header, "x-user-id");
        assert!(cfg.app.replica_credentials().is_none());
    }

    #[test]
    fn substitutes_default_when_variable_is_unset() {
        let yaml = "app:\n  database: ${BOOKMARKS_TEST_SURELY_UNSET_DB:-fallback.db}\n  port: 9000\n";
        let cfg = Config::from_yaml(yaml).unwrap();

        assert_eq!(cfg.app.get_db(), "fallback.db");
    }

    #[test]
    fn empty_turso_values_do_not_enable_replica_mode() {
        let yaml = r#"
app:
  database: bookmarks.db
  port: 8080
  turso_url: ""
  turso_auth_token: "token"
"#;
        let cfg = Config::from_yaml(yaml).unwrap();

        assert!(cfg.app.replica_credentials().is_none());
    }

    #[test]
    fn custom_identity_header_is_parsed() {
        let yaml = "app:\n  database: b.db\n  port: 1\nauth:\n  identity_header: X-Forwarded-User\n";
        let cfg = Config::from_yaml(yaml).unwrap();

        assert_eq!(cfg.auth.header_name().unwrap().as_str(), "x-forwarded-user");
    }

    #[test]
    fn rejects_invalid_identity_header() {
        let auth = Auth {
            identity_header: "not a header".to_string(),
        };

        assert!(auth.header_name().is_err());
    }
}
