use crate::prelude::*;
use codexr_core::settings::{Settings, SettingsLayer};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const OUTPUT_LOG_FILE: &str = "codexr.log";

/// Directory holding `config.toml` and the stored API key.
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs_next::config_dir()
        .ok_or_else(|| eyre!("Unable to determine config directory"))?
        .join("codexr"))
}

/// Directory holding the output log.
pub fn cache_dir() -> Result<PathBuf> {
    Ok(dirs_next::cache_dir()
        .ok_or_else(|| eyre!("Unable to determine cache directory"))?
        .join("codexr"))
}

/// Read a settings layer from `path`. A missing file is an empty layer.
pub fn read_layer(path: &Path) -> Result<SettingsLayer> {
    if !path.exists() {
        return Ok(SettingsLayer::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    SettingsLayer::from_toml(&contents)
        .map_err(|e| eyre!("{} ({})", e, path.display()))
}

/// Resolve settings: defaults, then the config file, then env/flags.
pub fn load_settings(global: &crate::Global) -> Result<Settings> {
    let path = match &global.config {
        Some(path) => path.clone(),
        None => config_dir()?.join(CONFIG_FILE),
    };

    let file_layer = read_layer(&path)?;
    let settings = Settings::resolve(&[file_layer, global.settings_layer()])
        .map_err(|e| eyre!("{}", e))?;

    log::debug!(
        "Settings: model={} api_base={} timeout_secs={} (config file: {})",
        settings.model,
        settings.api_base,
        settings.timeout_secs,
        path.display()
    );

    Ok(settings)
}
