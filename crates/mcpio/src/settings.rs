//! File-backed server settings.
//!
//! Lets a host keep the server identity in a TOML file instead of code:
//!
//! ```toml
//! name = "calculator"
//! version = "1.2.0"
//! ```
//!
//! Missing keys fall back to [`DEFAULTS`](crate::DEFAULTS) when the handler
//! is built. Present-but-empty keys are rejected the same way
//! [`with_name`] and [`with_version`] reject them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::{HandlerOption, with_name, with_version};

/// Server identity read from a settings file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Server name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Server version override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Settings {
    /// Parses settings from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::settings(e.to_string()))
    }

    /// Reads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::settings(format!("failed to read {}: {e}", path.display())))?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| Error::settings(format!("failed to parse {}: {e}", path.display())))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// The configuration steps these settings stand for.
    pub fn into_options(self) -> Vec<HandlerOption> {
        let mut options = Vec::new();
        if let Some(name) = self.name {
            options.push(with_name(name));
        }
        if let Some(version) = self.version {
            options.push(with_version(version));
        }
        options
    }
}

/// Applies file-backed settings as a single configuration step.
pub fn with_settings(settings: Settings) -> HandlerOption {
    HandlerOption::new("with_settings", move |cfg| {
        for option in settings.into_options() {
            option.apply(cfg)?;
        }
        Ok(())
    })
}
