use std::path::PathBuf;

use hirehub_common::PlatformError;

pub(super) const APP_NAME: &str = "hirehub";

/// Returns the platform-specific configuration directory for HireHub.
///
/// - macOS: `~/Library/Application Support/hirehub`
/// - Linux: `$XDG_CONFIG_HOME/hirehub` (defaults to `~/.config/hirehub`)
/// - Windows: `%APPDATA%\hirehub`
pub fn config_dir() -> Result<PathBuf, PlatformError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory for HireHub.
///
/// - macOS: `~/Library/Application Support/hirehub`
/// - Linux: `$XDG_DATA_HOME/hirehub` (defaults to `~/.local/share/hirehub`)
/// - Windows: `%APPDATA%\hirehub`
pub fn data_dir() -> Result<PathBuf, PlatformError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the path to the persisted login session.
///
/// Located at `data_dir()/session.json`.
pub fn session_file() -> Result<PathBuf, PlatformError> {
    Ok(data_dir()?.join("session.json"))
}
