//! Caller-owned configuration: cost parameters and an optional pepper.
//!
//! Nothing here reads the process environment. A configuration is either
//! built in code or loaded from a JSON file such as
//!
//! ```json
//! { "pepper": "deployment secret", "scrypt": { "n": 16384, "r": 8, "p": 1 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::crypto::{Pepper, ScryptParams};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Config {
    params: ScryptParams,
    pepper: Option<Pepper>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    pepper: Option<String>,
    scrypt: Option<ScryptParams>,
}

impl Config {
    pub fn new(params: ScryptParams, pepper: Option<Pepper>) -> Self {
        Self { params, pepper }
    }

    pub fn with_params(mut self, params: ScryptParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_pepper(mut self, pepper: Pepper) -> Self {
        self.pepper = Some(pepper);
        self
    }

    /// Cost parameters for new envelopes and messages.
    pub fn params(&self) -> &ScryptParams {
        &self.params
    }

    pub fn pepper(&self) -> Option<&Pepper> {
        self.pepper.as_ref()
    }

    /// Parses a JSON configuration. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;

        let params = file.scrypt.unwrap_or_default();
        if let Some(reason) = params.violation() {
            return Err(Error::Config(format!("scrypt parameters: {reason}")));
        }

        let pepper = file.pepper.map(Pepper::parse).transpose()?;

        Ok(Self { params, pepper })
    }

    /// Loads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// `<platform config dir>/pwseal/config.json`
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pwseal").map(|dirs| dirs.config_dir().join("config.json"))
}
