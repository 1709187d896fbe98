use crate::core::report::{ReportLocale, ReportSettings, DEFAULT_FILE_NAME, DEFAULT_TITLE};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "cartelera.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./data/catalog.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub file_name: String,
    pub locale: String,
    pub output_path: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            locale: "en-US".to_string(),
            output_path: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| CatalogError::Config {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Uses `path` when given; otherwise `cartelera.toml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::Config {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("store.path", &self.store.path)?;
        validation::validate_path("report.output_path", &self.report.output_path)?;
        validation::validate_non_empty_string("report.title", &self.report.title)?;
        validation::validate_non_empty_string("report.file_name", &self.report.file_name)?;
        validation::validate_file_extension("report.file_name", &self.report.file_name, &["pdf"])?;

        if ReportLocale::from_tag(&self.report.locale).is_none() {
            return Err(CatalogError::InvalidConfigValue {
                field: "report.locale".to_string(),
                value: self.report.locale.clone(),
                reason: format!(
                    "Unsupported locale. Valid locales: {}",
                    ReportLocale::SUPPORTED.join(", ")
                ),
            });
        }

        Ok(())
    }

    pub fn report_settings(&self) -> Result<ReportSettings> {
        let locale = ReportLocale::from_tag(&self.report.locale).ok_or_else(|| {
            CatalogError::InvalidConfigValue {
                field: "report.locale".to_string(),
                value: self.report.locale.clone(),
                reason: "Unsupported locale".to_string(),
            }
        })?;

        Ok(ReportSettings {
            title: self.report.title.clone(),
            file_name: self.report.file_name.clone(),
            locale,
            ..ReportSettings::default()
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
