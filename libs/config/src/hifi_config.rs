//! Engine Configuration Module
//!
//! Loads the YieldSpace curve parameters and logging settings from TOML files,
//! with `HIFI_`-prefixed environment variable overrides and validation of the
//! curve domain.

use crate::protocol::yield_space;
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Main engine configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HifiConfig {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Curve parameters shared by every pool
    #[serde(default)]
    pub yield_space: YieldSpaceConfig,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// YieldSpace fee coefficients and maturity horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldSpaceConfig {
    /// Fee coefficient when underlying flows in (below one)
    pub g1: Decimal,
    /// Fee coefficient when hTokens flow in (above one)
    pub g2: Decimal,
    /// Longest accepted time to maturity in seconds
    pub cutoff_ttm: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for YieldSpaceConfig {
    fn default() -> Self {
        Self {
            g1: yield_space::g1(),
            g2: yield_space::g2(),
            cutoff_ttm: yield_space::CUTOFF_TTM,
        }
    }
}

impl HifiConfig {
    /// Load configuration from a TOML file; missing sections take defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Override fields with `HIFI_*` environment variables if present
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("HIFI_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json) = std::env::var("HIFI_LOG_JSON") {
            self.logging.json = json.to_lowercase() == "true";
        }

        if let Ok(g1) = std::env::var("HIFI_G1") {
            match Decimal::from_str(&g1) {
                Ok(value) => self.yield_space.g1 = value,
                Err(e) => warn!("Ignoring HIFI_G1={}: {}", g1, e),
            }
        }

        if let Ok(g2) = std::env::var("HIFI_G2") {
            match Decimal::from_str(&g2) {
                Ok(value) => self.yield_space.g2 = value,
                Err(e) => warn!("Ignoring HIFI_G2={}: {}", g2, e),
            }
        }

        if let Ok(cutoff) = std::env::var("HIFI_CUTOFF_TTM") {
            match cutoff.parse::<u64>() {
                Ok(value) => self.yield_space.cutoff_ttm = value,
                Err(e) => warn!("Ignoring HIFI_CUTOFF_TTM={}: {}", cutoff, e),
            }
        }
    }

    /// Load a file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        debug!(?config, "Engine config ready");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.yield_space.validate()
    }
}

impl YieldSpaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.g1 <= Decimal::ZERO || self.g1 >= Decimal::ONE {
            bail!("g1 must be between 0 and 1 (exclusive), got {}", self.g1);
        }

        if self.g2 <= Decimal::ONE {
            bail!("g2 must be greater than 1, got {}", self.g2);
        }

        if self.cutoff_ttm == 0 {
            bail!("cutoff_ttm must be positive");
        }

        // Smallest exponent the curve can produce: 1 - g2 * cutoff / four years
        let t = Decimal::from(self.cutoff_ttm) / Decimal::from(yield_space::SECONDS_FOUR_YEARS);
        if Decimal::ONE - self.g2 * t <= Decimal::ZERO {
            bail!(
                "cutoff_ttm {} with g2 {} leaves no positive curve exponent",
                self.cutoff_ttm,
                self.g2
            );
        }

        Ok(())
    }
}
