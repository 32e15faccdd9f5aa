use crate::domain::model::QueryMode;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{self, Validate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "aria-bridge.toml";

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex = Regex::new(r"\$\{([^}]+)\}").unwrap();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub docling: DoclingSettings,
    pub graphrag: GraphRagSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoclingSettings {
    pub command: String,
    pub timeout_seconds: u64,
    /// Passed to `docling --image-export-mode`.
    pub image_export_mode: String,
}

impl Default for DoclingSettings {
    fn default() -> Self {
        Self {
            command: "docling".to_string(),
            timeout_seconds: 1800,
            image_export_mode: "referenced".to_string(),
        }
    }
}

impl DoclingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphRagSettings {
    pub command: String,
    pub timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub default_mode: QueryMode,
    pub default_community_level: u32,
}

impl Default for GraphRagSettings {
    fn default() -> Self {
        Self {
            command: "graphrag".to_string(),
            timeout_seconds: 3600,
            probe_timeout_seconds: 60,
            default_mode: QueryMode::Local,
            default_community_level: 2,
        }
    }
}

impl GraphRagSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
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
pub struct LoggingSettings {
    pub format: LogFormat,
}

impl BridgeConfig {
    /// Loads `path` if given, else `aria-bridge.toml` from the working
    /// directory if it exists, else defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| BridgeError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BridgeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// `DOCLING_COMMAND` and `GRAPHRAG_COMMAND` replace the configured programs.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(command) = lookup("DOCLING_COMMAND").filter(|c| !c.trim().is_empty()) {
            tracing::debug!("docling command overridden to: {}", command);
            self.docling.command = command;
        }
        if let Some(command) = lookup("GRAPHRAG_COMMAND").filter(|c| !c.trim().is_empty()) {
            tracing::debug!("graphrag command overridden to: {}", command);
            self.graphrag.command = command;
        }
    }
}

impl Validate for BridgeConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("docling.command", &self.docling.command)?;
        validation::validate_positive_number(
            "docling.timeout_seconds",
            self.docling.timeout_seconds,
            1,
        )?;
        validation::validate_one_of(
            "docling.image_export_mode",
            &self.docling.image_export_mode,
            &["referenced", "embedded", "placeholder"],
        )?;

        validation::validate_non_empty_string("graphrag.command", &self.graphrag.command)?;
        validation::validate_positive_number(
            "graphrag.timeout_seconds",
            self.graphrag.timeout_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "graphrag.probe_timeout_seconds",
            self.graphrag.probe_timeout_seconds,
            1,
        )?;

        Ok(())
    }
}
