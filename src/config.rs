//! Configuration loading from TOML.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::TradeupError;
use crate::model::Rarity;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite file holding the `prices` and `skins` tables.
    pub db_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { db_path: "skins.db".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Minimum ROI (expected value / cost) for a trade-up to be reported.
    pub threshold: f64,
    /// Input rarities to scan, in scan order.
    pub rarities: Vec<Rarity>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threshold: 0.9,
            rarities: vec![Rarity::Classified, Rarity::Restricted, Rarity::MilSpec],
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            bail!("scan threshold must be a non-negative number, got {}", self.threshold);
        }
        if let Some(r) = self.rarities.iter().find(|r| r.next().is_none()) {
            return Err(TradeupError::TerminalRarity(*r).into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub path: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { path: "profitable_tradeups.json".to_string() }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Like [`AppConfig::load`], but a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.scan.validate()?;
        Ok(config)
    }
}
