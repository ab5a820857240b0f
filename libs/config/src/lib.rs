//! # Hifi Engine Configuration
//!
//! Protocol constants, engine configuration loading and logging setup for the
//! Hifi pool engine.
//!
//! ## Features
//!
//! - **Protocol Constants**: YieldSpace fee coefficients, maturity horizon, token decimals
//! - **Engine Configuration**: TOML file, `HIFI_*` environment overrides, validation
//! - **Logging**: `tracing-subscriber` setup with optional JSON output
//!
//! ## Usage
//!
//! ```rust
//! use hifi_config::{protocol, HifiConfig};
//!
//! let config = HifiConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.yield_space.cutoff_ttm, protocol::yield_space::CUTOFF_TTM);
//! ```

pub mod hifi_config;
pub mod logging;
pub mod protocol;

// Re-export commonly used types
pub use hifi_config::{HifiConfig, LoggingConfig, YieldSpaceConfig};
pub use logging::init_tracing;
pub use protocol::*;
