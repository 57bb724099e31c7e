use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::state::config_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Symbol appended to printed amounts.
    pub currency: String,
    /// Account offered first when an import needs a preselected target.
    pub default_account: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "€".to_string(),
            default_account: None,
        }
    }
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}
