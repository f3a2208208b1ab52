use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::settings::ServerSettings;

/// Default settings location: `<config dir>/ventura/server_settings.json`.
pub fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ventura");
    path.push("server_settings.json");
    path
}

/// Missing file means defaults; a malformed file is an error.
pub fn load_settings(path: &Path) -> Result<ServerSettings> {
    if !path.exists() {
        info!(path = %path.display(), "no settings file, using defaults");
        return Ok(ServerSettings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .with_context(|| format!("invalid settings file {}", path.display()))?;

    info!(path = %path.display(), "loaded settings");
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &ServerSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
