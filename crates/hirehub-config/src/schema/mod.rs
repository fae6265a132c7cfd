//! Configuration schema types for HireHub.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with defaults matching the hosted backend.

mod api;
mod location;
mod notifications;
mod system;

pub use api::*;
pub use location::*;
pub use notifications::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Root configuration for HireHub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct HireHubConfig {
    pub api: ApiConfig,
    pub location: LocationConfig,
    pub notifications: NotificationsConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
