use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use readings_common::DateFormat;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Everything the service needs, resolved once at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for the rolling log files
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API with credentials. Empty means any
    /// origin, without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LookupConfig {
    /// External format of the `date` query parameter
    #[serde(default)]
    pub date_format: DateFormat,

    /// When set, requests must carry it in `X-API-Key`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Row-count hint handed to the sheet source
    #[serde(default)]
    pub row_limit: Option<usize>,
}

impl std::fmt::Debug for LookupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupConfig")
            .field("date_format", &self.date_format)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("row_limit", &self.row_limit)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Google(GoogleSheetConfig),
    File(FileSheetConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSheetConfig {
    /// JSON file holding `{"api_key": "..."}`
    pub credentials_path: PathBuf,

    /// Picks the spreadsheet out of `spreadsheets`
    pub sheet_number: u32,

    /// Sheet number -> spreadsheet id
    #[serde(default)]
    pub spreadsheets: HashMap<String, String>,

    /// A1 range or worksheet title to read
    #[serde(default = "default_range")]
    pub range: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GoogleSheetConfig {
    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheets
            .get(&self.sheet_number.to_string())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSheetConfig {
    /// JSON array of row objects
    pub path: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_range() -> String {
    "Sheet1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServiceConfig {
    /// Read the TOML file, apply environment overrides and validate.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`ServiceConfig::load`] with overrides taken from `var` instead of the
    /// process environment.
    pub fn load_with<F>(path: &str, var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;

        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path))?;
        config.apply_overrides(var)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        // An empty key disables the check, same as an empty API_KEY
        config.lookup.api_key = config.lookup.api_key.take().filter(|k| !k.is_empty());
        Ok(config)
    }

    /// Apply `SHEET_NUMBER`, `API_KEY`, `PORT` and `LOG_LEVEL` from `var`.
    pub fn apply_overrides<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Only meaningful for the google source, see `ignored_overrides`
        if let (Some(number), SourceConfig::Google(google)) = (var("SHEET_NUMBER"), &mut self.source) {
            google.sheet_number = number
                .trim()
                .parse()
                .with_context(|| format!("Invalid SHEET_NUMBER '{}'", number))?;
        }
        if let Some(key) = var("API_KEY") {
            self.lookup.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT '{}'", port))?;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Overrides present in `var` that the current config has no use for.
    /// Reported once logging is up.
    pub fn ignored_overrides<F>(&self, var: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ignored = Vec::new();
        if matches!(self.source, SourceConfig::File(_)) && var("SHEET_NUMBER").is_some() {
            ignored.push("SHEET_NUMBER");
        }
        ignored
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let SourceConfig::Google(google) = &self.source {
            if google.spreadsheet_id().is_none() {
                bail!(
                    "No spreadsheet configured for sheet number {}",
                    google.sheet_number
                );
            }
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_CONFIG: &str = r#"
log_level = "debug"

[server]
port = 9000
cors_origins = ["https://biblemind.onrender.com"]

[lookup]
date_format = "day_first"
api_key = "s3cret"

[source]
kind = "google"
credentials_path = "credentials.json"
sheet_number = 2

[source.spreadsheets]
"1" = "first-sheet"
"2" = "second-sheet"
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_google_config() {
        let config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.server_address(), "0.0.0.0:9000");
        assert_eq!(config.lookup.date_format, DateFormat::DayFirst);
        assert_eq!(config.lookup.api_key.as_deref(), Some("s3cret"));
        assert_eq!(config.lookup.row_limit, None);

        let SourceConfig::Google(google) = &config.source else {
            panic!("expected google source");
        };
        assert_eq!(google.spreadsheet_id(), Some("second-sheet"));
        assert_eq!(google.range, "Sheet1");
        assert_eq!(google.timeout_secs, 30);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_file_config() {
        let config = ServiceConfig::from_toml_str(
            r#"
[source]
kind = "file"
path = "data/readings.json"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.lookup.date_format, DateFormat::Iso);
        assert!(config.lookup.api_key.is_none());
        assert!(matches!(config.source, SourceConfig::File(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        config
            .apply_overrides(|key| match key {
                "SHEET_NUMBER" => Some("1".to_string()),
                "API_KEY" => Some("from-env".to_string()),
                "PORT" => Some("8080".to_string()),
                _ => None,
            })
            .unwrap();

        let SourceConfig::Google(google) = &config.source else {
            panic!("expected google source");
        };
        assert_eq!(google.spreadsheet_id(), Some("first-sheet"));
        assert_eq!(config.lookup.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_empty_api_key_disables_check() {
        let mut config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        config
            .apply_overrides(|key| (key == "API_KEY").then(String::new))
            .unwrap();
        assert!(config.lookup.api_key.is_none());
    }

    #[test]
    fn test_invalid_sheet_number_override() {
        let mut config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        let result = config.apply_overrides(|key| (key == "SHEET_NUMBER").then(|| "two".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_sheet_number_fails_validation() {
        let mut config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        config
            .apply_overrides(|key| (key == "SHEET_NUMBER").then(|| "7".to_string()))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        let printed = format!("{:?}", config.lookup);
        assert!(!printed.contains("s3cret"));
    }

    #[test]
    fn test_no_env_keeps_file_values() {
        let mut config = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        config.apply_overrides(no_env).unwrap();
        assert_eq!(config.lookup.api_key.as_deref(), Some("s3cret"));
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, GOOGLE_CONFIG).unwrap();

        let config = ServiceConfig::load_with(path.to_str().unwrap(), no_env).unwrap();
        assert_eq!(config.lookup.date_format, DateFormat::DayFirst);
        assert_eq!(config.server.port, 9000);

        let config = ServiceConfig::load_with(path.to_str().unwrap(), |key| {
            (key == "SHEET_NUMBER").then(|| "7".to_string())
        });
        assert!(config.is_err());
    }

    #[test]
    fn test_empty_api_key_in_file_disables_check() {
        let config = ServiceConfig::from_toml_str(
            r#"
[lookup]
api_key = ""

[source]
kind = "file"
path = "data/readings.json"
"#,
        )
        .unwrap();
        assert!(config.lookup.api_key.is_none());
    }

    #[test]
    fn test_sheet_number_ignored_for_file_source() {
        let mut config = ServiceConfig::from_toml_str(
            r#"
[source]
kind = "file"
path = "data/readings.json"
"#,
        )
        .unwrap();
        let env = |key: &str| (key == "SHEET_NUMBER").then(|| "2".to_string());
        config.apply_overrides(env).unwrap();
        assert_eq!(config.ignored_overrides(env), vec!["SHEET_NUMBER"]);

        let google = ServiceConfig::from_toml_str(GOOGLE_CONFIG).unwrap();
        assert!(google.ignored_overrides(env).is_empty());
    }
}
