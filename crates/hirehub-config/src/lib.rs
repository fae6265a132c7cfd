//! HireHub configuration system.
//!
//! Provides TOML-based configuration with full validation. All config
//! sections use defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hirehub_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config.api.base_url);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::HireHubConfig;

use std::path::Path;

use hirehub_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a commented default file if none exists.
pub fn load_config() -> Result<HireHubConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load and validate config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<HireHubConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}
