//! Full configuration validation.
//!
//! Validates numeric ranges, URLs and coordinates. Each domain has its own
//! submodule; this orchestrator calls them all and collects errors into a
//! single `ConfigError`.

mod api;
mod helpers;
mod presence;


use crate::schema::HireHubConfig;
use hirehub_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &HireHubConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    api::validate_api(&mut errors, config);
    presence::validate_location(&mut errors, config);
    presence::validate_notifications(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
