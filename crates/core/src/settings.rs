//! Settings resolution.
//!
//! Layers, lowest precedence first: built-in defaults, the `config.toml`
//! file, then explicit overrides (environment variables and CLI flags,
//! already merged by the caller).

use crate::gemini::{DEFAULT_MODEL, GEMINI_API_BASE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Gemini model identifier.
    pub model: String,
    /// Scheme and host of the Gemini REST API.
    pub api_base: String,
    /// Request timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// One partial layer. Unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsLayer {
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }
}

impl Settings {
    /// Apply `layer` on top of `self`. Blank strings count as unset.
    pub fn merge(mut self, layer: &SettingsLayer) -> Self {
        if let Some(model) = non_blank(layer.model.as_deref()) {
            self.model = model.to_string();
        }
        if let Some(api_base) = non_blank(layer.api_base.as_deref()) {
            self.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = layer.timeout_secs {
            self.timeout_secs = timeout;
        }
        self
    }

    pub fn resolve(layers: &[SettingsLayer]) -> Result<Self, SettingsError> {
        let settings = layers
            .iter()
            .fold(Settings::default(), |acc, layer| acc.merge(layer));
        settings.validate()?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.model.contains('/') || self.model.contains('?') || self.model.contains(' ') {
            return Err(SettingsError::Invalid {
                field: "model",
                reason: format!("'{}' is not a model identifier", self.model),
            });
        }
        if !(self.api_base.starts_with("https://") || self.api_base.starts_with("http://")) {
            return Err(SettingsError::Invalid {
                field: "api_base",
                reason: format!("'{}' must start with http:// or https://", self.api_base),
            });
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
