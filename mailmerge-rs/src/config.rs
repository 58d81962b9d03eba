//! Sender profiles
//!
//! A sender configuration file maps a profile name to the SMTP account and
//! headers used for one run. JSON is the default format; files ending in
//! `.toml` are read as TOML.

use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::{MergeError, Result};
use crate::headers::{deserialize_ordered, Headers};

/// Default location of the sender configuration file
pub const DEFAULT_CONFIG_PATH: &str = "senderconfig.json";

/// One sender profile
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SenderConfig {
    /// Headers that take precedence over the campaign's own headers
    pub headers: Headers,
    /// SMTP submission endpoint, `host` or `host:port`
    pub server: String,
    pub login: String,
    pub pwd: String,
    /// When set, every message is delivered here instead of to its recipient
    #[serde(default)]
    pub override_recipient: Option<String>,
}

impl SenderConfig {
    /// One-line description used when choosing a profile
    pub fn summary(&self) -> String {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| format!("{}: '{}'", name, value))
            .collect::<Vec<_>>()
            .join(", ");

        match &self.override_recipient {
            Some(target) => format!("{}; mock send to {}", headers, target),
            None => headers,
        }
    }
}

/// All profiles of a configuration file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderProfiles(Vec<(String, SenderConfig)>);

impl<'de> Deserialize<'de> for SenderProfiles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_ordered(deserializer).map(SenderProfiles)
    }
}

impl SenderProfiles {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| MergeError::Config(format!("{}: {}", path.display(), e)))?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| MergeError::Config(e.to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MergeError::Config(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&SenderConfig> {
        self.0
            .iter()
            .find(|(profile, _)| profile == name)
            .map(|(_, config)| config)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SenderConfig)> {
        self.0.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
