use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub periods: PeriodsConfig,
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Header aliases renamed to the canonical manager / client fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_manager_aliases")]
    pub manager: Vec<String>,
    #[serde(default = "default_client_aliases")]
    pub client: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodsConfig {
    /// Explicit period labels; empty means discover them from the header.
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvConfig {
    #[serde(default)]
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_clients")]
    pub top_clients: usize,
}

fn default_manager_aliases() -> Vec<String> {
    ["Менеджер", "Manager", "manager"].map(String::from).to_vec()
}
fn default_client_aliases() -> Vec<String> {
    ["Клієнт", "Client", "client", "Клиент"].map(String::from).to_vec()
}
fn default_top_clients() -> usize { 50 }

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            manager: default_manager_aliases(),
            client: default_client_aliases(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_clients: default_top_clients(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.manager.is_empty() || self.columns.client.is_empty() {
            return Err(Error::Config(
                "column aliases for manager and client must not be empty".to_string(),
            ));
        }
        if let Some(delimiter) = self.csv.delimiter {
            if !delimiter.is_ascii() {
                return Err(Error::Config(format!(
                    "delimiter '{}' must be a single ASCII character",
                    delimiter
                )));
            }
        }
        Ok(())
    }
}
